use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DataEnum, DataStruct, DeriveInput, Fields};

use crate::attributes::{EnumRepr, enum_repr};
use crate::fields::StructFields;
use crate::path;

// -----------------------------------------------------------------------------
// Entry

pub(crate) fn impl_codec(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let og_object_path = path::og_object();
    match &ast.data {
        Data::Struct(data) => impl_struct(ast, data, &og_object_path),
        Data::Enum(data) => impl_enum(ast, data, &og_object_path),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &ast.ident,
            "`Codec` cannot be derived for unions",
        )),
    }
}

// -----------------------------------------------------------------------------
// Struct

fn impl_struct(
    ast: &DeriveInput,
    data: &DataStruct,
    og_object_path: &syn::Path,
) -> syn::Result<TokenStream> {
    let codec_ = path::codec_(og_object_path);
    let context_ = path::context_(og_object_path);
    let data_ = path::data_(og_object_path);
    let data_reader_ = path::data_reader_(og_object_path);
    let read_error_ = path::read_error_(og_object_path);
    let append_key_ = path::append_key_(og_object_path);
    let alloc_ = path::alloc_(og_object_path);
    let core_ = path::core_(og_object_path);

    let fields = StructFields::collect(&data.fields)?;
    let generics = fields.bounded_generics(&ast.generics, &codec_);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let ident = &ast.ident;

    let min_wire_size = fields.min_wire_size(&codec_);
    let write = fields.write_body(&codec_);
    let read = fields.read_body(&codec_);
    let append = fields.append_body(&codec_, &append_key_);
    let clone = fields.clone_body(&codec_);
    let check = fields.check_body(&codec_);
    let reset = fields.reset_body(&codec_);
    let default = fields.default_body(&codec_);

    Ok(quote! {
        #[allow(unused_variables)]
        impl #impl_generics #codec_ for #ident #ty_generics #where_clause {
            const MIN_WIRE_SIZE: usize = #min_wire_size;

            fn write_data(&self, ctx: &mut #context_, data: &mut #data_) {
                #write
            }

            fn read_data(
                &mut self,
                ctx: &mut #context_,
                reader: &mut #data_reader_<'_>,
            ) -> #core_::result::Result<(), #read_error_> {
                #read
                #core_::result::Result::Ok(())
            }

            fn append_text(&self, ctx: &mut #context_, out: &mut #alloc_::string::String) {
                #append
            }

            fn clone_data(&self, ctx: &mut #context_, target: &mut Self) {
                #clone
            }

            fn recursive_check(&self, ctx: &mut #context_) -> u32 {
                #check
            }

            fn recursive_reset(&mut self, ctx: &mut #context_) {
                #reset
            }

            fn set_default_value(&mut self, ctx: &mut #context_) {
                #default
            }
        }
    })
}

// -----------------------------------------------------------------------------
// Enum

fn impl_enum(
    ast: &DeriveInput,
    data: &DataEnum,
    og_object_path: &syn::Path,
) -> syn::Result<TokenStream> {
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "`Codec` can only be derived for field-less enums",
            ));
        }
    }
    let Some(first) = data.variants.first() else {
        return Err(syn::Error::new_spanned(
            &ast.ident,
            "`Codec` needs at least one variant",
        ));
    };
    let first = &first.ident;

    let codec_ = path::codec_(og_object_path);
    let context_ = path::context_(og_object_path);
    let data_ = path::data_(og_object_path);
    let data_reader_ = path::data_reader_(og_object_path);
    let read_error_ = path::read_error_(og_object_path);
    let alloc_ = path::alloc_(og_object_path);
    let core_ = path::core_(og_object_path);

    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let ident = &ast.ident;
    let variants: Vec<_> = data.variants.iter().map(|variant| &variant.ident).collect();
    let values = &variants;

    let (repr, write, read) = match enum_repr(&ast.attrs)? {
        EnumRepr::Byte => (
            quote! { u8 },
            quote! { data.write_u8(value); },
            quote! { let value = reader.read_u8()?; },
        ),
        EnumRepr::Unsigned => (
            quote! { u64 },
            quote! { data.write_var_u64(value); },
            quote! { let value = reader.read_var_u64()?; },
        ),
        EnumRepr::Signed => (
            quote! { i64 },
            quote! { data.write_var_i64(value); },
            quote! { let value = reader.read_var_i64()?; },
        ),
    };

    Ok(quote! {
        impl #impl_generics #codec_ for #ident #ty_generics #where_clause {
            fn write_data(&self, _: &mut #context_, data: &mut #data_) {
                let value = match self {
                    #( Self::#variants => Self::#values as #repr, )*
                };
                #write
            }

            fn read_data(
                &mut self,
                _: &mut #context_,
                reader: &mut #data_reader_<'_>,
            ) -> #core_::result::Result<(), #read_error_> {
                #read
                #(
                    if value == Self::#values as #repr {
                        *self = Self::#variants;
                        return #core_::result::Result::Ok(());
                    }
                )*
                #core_::result::Result::Err(#read_error_::MalformedScalar)
            }

            fn append_text(&self, _: &mut #context_, out: &mut #alloc_::string::String) {
                let value = match self {
                    #( Self::#variants => Self::#values as #repr, )*
                };
                out.push_str(&#alloc_::string::ToString::to_string(&value));
            }

            fn clone_data(&self, _: &mut #context_, target: &mut Self) {
                *target = match self {
                    #( Self::#variants => Self::#values, )*
                };
            }

            fn set_default_value(&mut self, _: &mut #context_) {
                *self = Self::#first;
            }
        }
    })
}
