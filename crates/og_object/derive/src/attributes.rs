//! Parsers for `#[codec(...)]` and `#[object(...)]`.

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Attribute, LitInt, Path};

use crate::{CODEC_ATTRIBUTE_NAME, OBJECT_ATTRIBUTE_NAME};

// -----------------------------------------------------------------------------
// Field Attributes

/// Attributes accepted on a field.
#[derive(Default, Debug)]
pub(crate) struct FieldAttributes {
    /// `#[codec(skip)]`
    pub skip: Option<Span>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(CODEC_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    if result.skip.is_some() {
                        return Err(meta.error("duplicate `skip`"));
                    }
                    result.skip = Some(meta.path.span());
                    Ok(())
                } else {
                    Err(meta.error("unknown codec attribute, expected `skip`"))
                }
            })?;
        }
        Ok(result)
    }
}

// -----------------------------------------------------------------------------
// Object Attributes

/// Attributes accepted on a `#[derive(Object)]` type.
#[derive(Default, Debug)]
pub(crate) struct ObjectAttributes {
    /// `id = N`, already checked to be a nonzero `u16`.
    pub id: Option<LitInt>,
    /// `parent = Path`
    pub parent: Option<Path>,
    /// `trivial`
    pub trivial: Option<Span>,
    /// `auto_register`
    pub auto_register: Option<Span>,
}

impl ObjectAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(OBJECT_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    if result.id.is_some() {
                        return Err(meta.error("duplicate `id`"));
                    }
                    let lit: LitInt = meta.value()?.parse()?;
                    let id: u16 = lit.base10_parse()?;
                    if id == 0 {
                        return Err(syn::Error::new(lit.span(), "type id 0 is reserved for the root"));
                    }
                    result.id = Some(lit);
                    Ok(())
                } else if meta.path.is_ident("parent") {
                    if result.parent.is_some() {
                        return Err(meta.error("duplicate `parent`"));
                    }
                    result.parent = Some(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("trivial") {
                    result.trivial = Some(meta.path.span());
                    Ok(())
                } else if meta.path.is_ident("auto_register") {
                    result.auto_register = Some(meta.path.span());
                    Ok(())
                } else {
                    Err(meta.error(
                        "unknown object attribute, expected `id`, `parent`, `trivial` or `auto_register`",
                    ))
                }
            })?;
        }
        Ok(result)
    }
}

// -----------------------------------------------------------------------------
// Repr

/// Wire form of an enum discriminant, chosen by its `#[repr]`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum EnumRepr {
    /// `u8` or `i8`, one raw byte.
    Byte,
    /// Wider unsigned reprs, a plain varint.
    Unsigned,
    /// Signed reprs and no repr at all, a zig-zag varint.
    Signed,
}

pub(crate) fn enum_repr(attrs: &[Attribute]) -> syn::Result<EnumRepr> {
    let mut repr = EnumRepr::Signed;
    for attr in attrs {
        if !attr.path().is_ident("repr") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("u8") || meta.path.is_ident("i8") {
                repr = EnumRepr::Byte;
            } else if ["u16", "u32", "u64", "usize"].iter().any(|ty| meta.path.is_ident(ty)) {
                repr = EnumRepr::Unsigned;
            } else if meta.input.peek(syn::token::Paren) {
                // `align(N)`, `packed(N)`
                let content;
                syn::parenthesized!(content in meta.input);
                content.parse::<proc_macro2::TokenStream>()?;
            }
            Ok(())
        })?;
    }
    Ok(repr)
}
