//! Paths into `og_object` used by the generated code.
//!
//! Everything hangs off the crate path, so a move inside `og_object` only
//! needs a change here.

use proc_macro2::TokenStream;
use quote::quote;

// -----------------------------------------------------------------------------
// Crate Path

/// Get the correct access path to the `og_object` crate.
///
/// 1. For crates that depend on `og_object`, `::og_object` is returned.
/// 2. For crates that depend on `og_core`, `::og_core::object` is returned.
/// 3. For crates that depend on `og`, `::og::object` is returned.
/// 4. Otherwise `::og_object` is returned, which may be incorrect.
///
/// Reading the manifest is relatively expensive, so the path is obtained
/// once per derive and passed around.
pub(crate) fn og_object() -> syn::Path {
    og_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("og_object"))
}

// -----------------------------------------------------------------------------
// Items

#[inline(always)]
pub(crate) fn codec_(og_object_path: &syn::Path) -> TokenStream {
    quote! { #og_object_path::Codec }
}

#[inline(always)]
pub(crate) fn context_(og_object_path: &syn::Path) -> TokenStream {
    quote! { #og_object_path::Context }
}

#[inline(always)]
pub(crate) fn data_(og_object_path: &syn::Path) -> TokenStream {
    quote! { #og_object_path::Data }
}

#[inline(always)]
pub(crate) fn data_reader_(og_object_path: &syn::Path) -> TokenStream {
    quote! { #og_object_path::DataReader }
}

#[inline(always)]
pub(crate) fn read_error_(og_object_path: &syn::Path) -> TokenStream {
    quote! { #og_object_path::ReadError }
}

#[inline(always)]
pub(crate) fn object_(og_object_path: &syn::Path) -> TokenStream {
    quote! { #og_object_path::Object }
}

#[inline(always)]
pub(crate) fn object_kind_(og_object_path: &syn::Path) -> TokenStream {
    quote! { #og_object_path::ObjectKind }
}

#[inline(always)]
pub(crate) fn object_type_(og_object_path: &syn::Path) -> TokenStream {
    quote! { #og_object_path::ObjectType }
}

#[inline(always)]
pub(crate) fn obj_ptr_(og_object_path: &syn::Path) -> TokenStream {
    quote! { #og_object_path::ObjPtr }
}

#[inline(always)]
pub(crate) fn append_key_(og_object_path: &syn::Path) -> TokenStream {
    quote! { #og_object_path::codec::append_key }
}

#[inline(always)]
pub(crate) fn alloc_(og_object_path: &syn::Path) -> TokenStream {
    quote! { #og_object_path::__macro_exports::alloc }
}

#[inline(always)]
pub(crate) fn core_(og_object_path: &syn::Path) -> TokenStream {
    quote! { #og_object_path::__macro_exports::core }
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(og_object_path: &syn::Path) -> TokenStream {
    quote! { #og_object_path::__macro_exports::auto_register }
}
