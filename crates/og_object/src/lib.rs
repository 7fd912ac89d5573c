#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Derive macros emit `::og_object::...` paths, this alias lets the crate
// use its own derives.
extern crate self as og_object;

// Public for the `__macro_exports` re-export.
#[doc(hidden)]
pub extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod context;
mod data;
mod error;
mod object;
mod ptr;

pub mod codec;
pub mod registry;

// -----------------------------------------------------------------------------
// Top-Level exports

pub mod __macro_exports;

pub use codec::Codec;
pub use context::Context;
pub use data::{Data, DataReader, FixedWidth};
pub use error::ReadError;
pub use object::{Object, ObjectKind, ObjectType};
pub use og_object_derive::{Codec, Object};
pub use ptr::{ObjPtr, ObjWeak};
