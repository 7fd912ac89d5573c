//! Field collection and the per-algorithm bodies shared by both derives.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Fields, Generics, Index, Member, Type, parse_quote};

use crate::attributes::FieldAttributes;

// -----------------------------------------------------------------------------
// StructFields

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Shape {
    Named,
    Tuple,
    Unit,
}

/// A field visited by the algorithms.
pub(crate) struct CodecField<'a> {
    pub member: Member,
    /// Text key, only meaningful for named fields.
    pub name: String,
    pub ty: &'a Type,
}

/// The visited fields of a struct, in declaration order.
pub(crate) struct StructFields<'a> {
    pub shape: Shape,
    pub fields: Vec<CodecField<'a>>,
}

impl<'a> StructFields<'a> {
    pub fn collect(fields: &'a Fields) -> syn::Result<Self> {
        let shape = match fields {
            Fields::Named(_) => Shape::Named,
            Fields::Unnamed(_) => Shape::Tuple,
            Fields::Unit => Shape::Unit,
        };

        let mut result = Vec::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            if FieldAttributes::parse_attrs(&field.attrs)?.skip.is_some() {
                continue;
            }
            let (member, name) = match &field.ident {
                Some(ident) => (Member::Named(ident.clone()), ident.to_string()),
                None => (Member::Unnamed(Index::from(index)), index.to_string()),
            };
            result.push(CodecField {
                member,
                name,
                ty: &field.ty,
            });
        }

        Ok(Self {
            shape,
            fields: result,
        })
    }

    /// Adds `Field: Codec` for every visited field of a generic type.
    pub fn bounded_generics(&self, generics: &Generics, codec_: &TokenStream) -> Generics {
        let mut generics = generics.clone();
        if generics.params.is_empty() {
            return generics;
        }
        let where_clause = generics.make_where_clause();
        for field in &self.fields {
            let ty = field.ty;
            where_clause.predicates.push(parse_quote! { #ty: #codec_ });
        }
        generics
    }

    fn members(&self) -> impl Iterator<Item = &Member> {
        self.fields.iter().map(|field| &field.member)
    }

    pub fn min_wire_size(&self, codec_: &TokenStream) -> TokenStream {
        let tys = self.fields.iter().map(|field| field.ty);
        quote! { 0usize #( + <#tys as #codec_>::MIN_WIRE_SIZE )* }
    }

    pub fn write_body(&self, codec_: &TokenStream) -> TokenStream {
        let members = self.members();
        quote! { #( #codec_::write_data(&self.#members, ctx, data); )* }
    }

    pub fn read_body(&self, codec_: &TokenStream) -> TokenStream {
        let members = self.members();
        quote! { #( #codec_::read_data(&mut self.#members, ctx, reader)?; )* }
    }

    /// `"key":value` pairs separated by commas, each pair preceded by a comma
    /// when `leading_comma` is set.
    pub fn append_fields(
        &self,
        codec_: &TokenStream,
        append_key_: &TokenStream,
        leading_comma: bool,
    ) -> TokenStream {
        let parts = self.fields.iter().enumerate().map(|(index, field)| {
            let member = &field.member;
            let comma = if leading_comma || index > 0 {
                quote! { out.push(','); }
            } else {
                TokenStream::new()
            };
            let key = if self.shape == Shape::Named {
                let name = &field.name;
                quote! { #append_key_(out, #name); }
            } else {
                TokenStream::new()
            };
            quote! {
                #comma
                #key
                #codec_::append_text(&self.#member, ctx, out);
            }
        });
        quote! { #( #parts )* }
    }

    /// The complete text form of a plain struct.
    pub fn append_body(&self, codec_: &TokenStream, append_key_: &TokenStream) -> TokenStream {
        let (open, close) = match self.shape {
            Shape::Tuple => ('[', ']'),
            Shape::Named | Shape::Unit => ('{', '}'),
        };
        let fields = self.append_fields(codec_, append_key_, false);
        quote! {
            out.push(#open);
            #fields
            out.push(#close);
        }
    }

    /// Clones every field into `target`, a `&mut Self`.
    pub fn clone_body(&self, codec_: &TokenStream) -> TokenStream {
        let sources = self.members();
        let targets = self.members();
        quote! { #( #codec_::clone_data(&self.#sources, ctx, &mut target.#targets); )* }
    }

    pub fn check_body(&self, codec_: &TokenStream) -> TokenStream {
        let members = self.members();
        quote! {
            #(
                let index = #codec_::recursive_check(&self.#members, ctx);
                if index != 0 {
                    return index;
                }
            )*
            0
        }
    }

    pub fn reset_body(&self, codec_: &TokenStream) -> TokenStream {
        let members = self.members();
        quote! { #( #codec_::recursive_reset(&mut self.#members, ctx); )* }
    }

    pub fn default_body(&self, codec_: &TokenStream) -> TokenStream {
        let members = self.members();
        quote! { #( #codec_::set_default_value(&mut self.#members, ctx); )* }
    }
}
