//! See following macros:
//!
//! - [`Codec`]
//! - [`Object`]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static CODEC_ATTRIBUTE_NAME: &str = "codec";
static OBJECT_ATTRIBUTE_NAME: &str = "object";

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod codec;
mod fields;
mod object;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Codec Derivation
///
/// `#[derive(Codec)]` implements `Codec` for structs and field-less enums.
///
/// ## Structs
///
/// Every field must implement `Codec`. Fields are visited in declaration
/// order by all seven algorithms; the binary form is the plain
/// concatenation of the fields.
///
/// ```rust, ignore
/// #[derive(Codec, Default)]
/// struct Player {
///     name: String,
///     score: u32,
///     #[codec(skip)]
///     cached_rank: usize,
/// }
/// ```
///
/// `#[codec(skip)]` leaves a field out of every algorithm: it is neither
/// written, read, cloned nor reset.
///
/// Text form: `{"name":"..","score":0}` for named fields, `[..]` for tuple
/// structs.
///
/// Generic parameters get a `Field: Codec` bound for every visited field.
///
/// ## Enums
///
/// Only field-less enums are supported. The discriminant is stored as a
/// single byte with `#[repr(u8)]` or `#[repr(i8)]`, as a plain LEB128
/// integer with a wider unsigned repr, and as a zig-zag LEB128 integer
/// otherwise. Reading an unknown discriminant fails with
/// `ReadError::MalformedScalar`; the default value is the first variant.
///
/// ```rust, ignore
/// #[derive(Codec, Default)]
/// #[repr(u8)]
/// enum Mode {
///     #[default]
///     Idle = 1,
///     Busy = 2,
/// }
/// ```
#[proc_macro_derive(Codec, attributes(codec))]
pub fn derive_codec(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    codec::impl_codec(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// # Object Derivation
///
/// `#[derive(Object)]` turns a struct into a polymorphic object type. It
/// implements `ObjectKind`, `ObjectType`, `Object`, and `Codec` (by value,
/// forwarding to the object methods).
///
/// The type must implement `Default` and have no generic parameters.
///
/// ```rust, ignore
/// #[derive(Object, Default)]
/// #[object(id = 12, parent = Shape, auto_register)]
/// struct Circle {
///     radius: f32,
///     #[codec(skip)]
///     cached_area: f32,
/// }
/// ```
///
/// ## Type Attributes
///
/// - `id = N`: the registered type id, nonzero and unique per process.
/// - `parent = Path`: the parent kind, any `ObjectKind`. Defaults to the
///   root `dyn Object`.
/// - `trivial`: the object holds no handle; roots of this type skip visit
///   bookkeeping.
/// - `auto_register`: submit the type to `registry::auto_register`.
///   Requires the `auto_register` feature, ignored otherwise.
///
/// Fields accept `#[codec(skip)]` as in [`Codec`].
///
/// Text form: `{"__typeId__":12,"radius":1.5}`.
#[proc_macro_derive(Object, attributes(object, codec))]
pub fn derive_object(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    object::impl_object(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
