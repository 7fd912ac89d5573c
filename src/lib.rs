#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use og_object as object;
pub use og_ptr as ptr;
pub use og_utils as utils;
