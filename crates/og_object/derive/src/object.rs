use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput};

use crate::attributes::ObjectAttributes;
use crate::fields::StructFields;
use crate::path;

// -----------------------------------------------------------------------------
// Entry

pub(crate) fn impl_object(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let attrs = ObjectAttributes::parse_attrs(&ast.attrs)?;
    let Some(id) = &attrs.id else {
        return Err(syn::Error::new_spanned(
            &ast.ident,
            "`Object` needs a type id: `#[object(id = N)]`",
        ));
    };
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.generics,
            "`Object` cannot be derived for generic types",
        ));
    }
    let Data::Struct(data) = &ast.data else {
        return Err(syn::Error::new_spanned(
            &ast.ident,
            "`Object` can only be derived for structs",
        ));
    };

    let og_object_path = path::og_object();
    let codec_ = path::codec_(&og_object_path);
    let context_ = path::context_(&og_object_path);
    let data_ = path::data_(&og_object_path);
    let data_reader_ = path::data_reader_(&og_object_path);
    let read_error_ = path::read_error_(&og_object_path);
    let object_ = path::object_(&og_object_path);
    let object_kind_ = path::object_kind_(&og_object_path);
    let object_type_ = path::object_type_(&og_object_path);
    let obj_ptr_ = path::obj_ptr_(&og_object_path);
    let append_key_ = path::append_key_(&og_object_path);
    let alloc_ = path::alloc_(&og_object_path);
    let core_ = path::core_(&og_object_path);

    let ident = &ast.ident;
    let name = ident.to_string();
    let parent_id = match &attrs.parent {
        Some(parent) => quote! { <#parent as #object_kind_>::TYPE_ID },
        None => quote! { 0 },
    };
    let trivial = attrs.trivial.is_some();

    let fields = StructFields::collect(&data.fields)?;
    let min_wire_size = fields.min_wire_size(&codec_);
    let write = fields.write_body(&codec_);
    let read = fields.read_body(&codec_);
    let append_core = fields.append_fields(&codec_, &append_key_, true);
    let clone = fields.clone_body(&codec_);
    let check = fields.check_body(&codec_);
    let reset = fields.reset_body(&codec_);
    let default = fields.default_body(&codec_);

    let auto_register = auto_register_impl(&attrs, ident, &og_object_path);

    Ok(quote! {
        impl #object_kind_ for #ident {
            const TYPE_ID: u16 = #id;
            const PARENT_ID: u16 = #parent_id;
            const NAME: &'static str = #name;
        }

        impl #object_type_ for #ident {
            const TRIVIAL: bool = #trivial;
        }

        #[allow(unused_variables)]
        impl #object_ for #ident {
            #[inline]
            fn type_id_of(&self) -> u16 {
                <Self as #object_kind_>::TYPE_ID
            }

            #[inline]
            fn create_default(&self) -> #obj_ptr_ {
                #obj_ptr_::make(<Self as #core_::default::Default>::default())
            }

            fn write(&self, ctx: &mut #context_, data: &mut #data_) {
                #write
            }

            fn read(
                &mut self,
                ctx: &mut #context_,
                reader: &mut #data_reader_<'_>,
            ) -> #core_::result::Result<(), #read_error_> {
                #read
                #core_::result::Result::Ok(())
            }

            fn append_core(&self, ctx: &mut #context_, out: &mut #alloc_::string::String) {
                #append_core
            }

            fn clone_to(&self, ctx: &mut #context_, target: &mut dyn #object_) {
                let target: &mut dyn #core_::any::Any = target;
                if let #core_::option::Option::Some(target) = target.downcast_mut::<Self>() {
                    #clone
                }
            }

            fn recursive_check(&self, ctx: &mut #context_) -> u32 {
                #check
            }

            fn recursive_reset(&mut self, ctx: &mut #context_) {
                #reset
            }

            fn set_default(&mut self, ctx: &mut #context_) {
                #default
            }
        }

        #[allow(unused_variables)]
        impl #codec_ for #ident {
            const MIN_WIRE_SIZE: usize = #min_wire_size;

            #[inline]
            fn write_data(&self, ctx: &mut #context_, data: &mut #data_) {
                #object_::write(self, ctx, data);
            }

            #[inline]
            fn read_data(
                &mut self,
                ctx: &mut #context_,
                reader: &mut #data_reader_<'_>,
            ) -> #core_::result::Result<(), #read_error_> {
                #object_::read(self, ctx, reader)
            }

            #[inline]
            fn append_text(&self, ctx: &mut #context_, out: &mut #alloc_::string::String) {
                #object_::append(self, ctx, out);
            }

            fn clone_data(&self, ctx: &mut #context_, target: &mut Self) {
                #clone
            }

            #[inline]
            fn recursive_check(&self, ctx: &mut #context_) -> u32 {
                #object_::recursive_check(self, ctx)
            }

            #[inline]
            fn recursive_reset(&mut self, ctx: &mut #context_) {
                #object_::recursive_reset(self, ctx);
            }

            #[inline]
            fn set_default_value(&mut self, ctx: &mut #context_) {
                #object_::set_default(self, ctx);
            }
        }

        #auto_register
    })
}

// -----------------------------------------------------------------------------
// Auto Register

#[cfg(feature = "auto_register")]
fn auto_register_impl(
    attrs: &ObjectAttributes,
    ident: &syn::Ident,
    og_object_path: &syn::Path,
) -> TokenStream {
    let Some(span) = attrs.auto_register else {
        return TokenStream::new();
    };
    let auto_register_ = path::auto_register_(og_object_path);
    quote::quote_spanned! { span =>
        #auto_register_::inventory::submit! {
            #auto_register_::AutoRegisterFn(#auto_register_::register_type::<#ident>)
        }
    }
}

#[cfg(not(feature = "auto_register"))]
fn auto_register_impl(_: &ObjectAttributes, _: &syn::Ident, _: &syn::Path) -> TokenStream {
    TokenStream::new()
}
