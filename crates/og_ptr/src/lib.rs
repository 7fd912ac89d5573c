//! This crate provides the non-atomic reference-counted handle pair used by
//! the object model.
//!
//! **Strong** and **Weak**
//!
//! [`Strong<T>`] owns one strong count of a shared payload, [`Weak<T>`] owns one
//! weak count. The payload is destroyed when the last strong handle goes away;
//! the allocation itself lives until the weak handles are gone too, so a weak
//! handle can always tell whether its target is still alive.
//!
//! **SharedBox**
//!
//! Both handles point at a single [`SharedBox<T>`] allocation: a [`Header`]
//! holding the counts and a runtime type tag, followed by the payload inside a
//! [`RefCell`](core::cell::RefCell). Payloads are mutated through shared
//! handles, the cell turns overlapping mutable access into a borrow failure.
//!
//! Counts are plain integers. Neither handle is `Send` or `Sync`.
//!
//! # Examples
//!
//! ```
//! use og_ptr::{Strong, Weak};
//!
//! let a = Strong::new(5_i32);
//! let w: Weak<i32> = a.downgrade();
//!
//! assert_eq!(a.strong_count(), 1);
//! assert_eq!(a.weak_count(), 1);
//! assert_eq!(*w.upgrade().borrow(), 5);
//!
//! drop(a);
//! assert!(w.upgrade().is_null());
//! ```
#![expect(unsafe_code, reason = "Raw pointers are inherently unsafe.")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod header;
mod strong;
mod weak;

// -----------------------------------------------------------------------------
// Top-level exports

pub use header::{Header, SharedBox};
pub use strong::Strong;
pub use weak::Weak;
