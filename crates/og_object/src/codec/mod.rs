//! The per-shape half of the graph algorithms.
//!
//! [`Context`] owns the walk; [`Codec`] says how one value of a given shape
//! takes part in it. Every field of an object is a `Codec`, so each of the
//! seven algorithms is a plain recursion over fields that only turns to the
//! context when it meets a shared handle.
//!
//! ## Implemented Menu
//!
//! - scalars: `bool`, `char`, `u8`-`u64`, `i8`-`i64`, `usize`, `isize`,
//!   `f32`, `f64`, `()`
//! - tuples: `(P0,)` up to `(P0, ..., P7)`
//! - `Option<T>`, `Box<T>`
//! - `String`, [`Data`]
//! - sequences: `Vec<T>`, `VecDeque<T>`, `BTreeSet<T>`, std and hashbrown
//!   `HashSet<T>`
//! - maps: `BTreeMap<K, V>`, std and hashbrown `HashMap<K, V>`
//! - handles: `Strong<T>`, `Weak<T>`, [`ObjPtr<K>`], [`ObjWeak<K>`]
//!
//! ## Wire form
//!
//! | shape | bytes |
//! |---|---|
//! | `bool`, `u8`, `i8` | one byte |
//! | wider integers | LEB128, signed ones zig-zag mapped |
//! | `f32`, `f64` | little-endian fixed width |
//! | `String`, [`Data`] | length, raw bytes |
//! | sequences, maps | count, elements or key/value pairs |
//! | `Option`, `Strong`, `Weak` | `0x00`, or `0x01` and the payload |
//! | [`ObjPtr`], [`ObjWeak`] | `0x00`; back-reference index; or new index, type id and fields |
//!
//! [`ObjPtr`]: crate::ObjPtr
//! [`ObjPtr<K>`]: crate::ObjPtr
//! [`ObjWeak`]: crate::ObjWeak
//! [`ObjWeak<K>`]: crate::ObjWeak

use alloc::string::String;

use crate::{Context, Data, DataReader, ReadError};

// -----------------------------------------------------------------------------
// Modules

mod utils;

mod handle;
mod map;
mod option;
mod scalar;
mod seq;
mod text;
mod tuple;

// -----------------------------------------------------------------------------
// Exports

pub use utils::{append_escaped, append_key};

// -----------------------------------------------------------------------------
// Codec

/// A value that takes part in the graph algorithms of [`Context`].
///
/// Implementations should not call each other directly on the root value;
/// go through [`Context`]'s entry points so the bookkeeping is cleared.
/// Inside an implementation, use the member helpers
/// ([`Context::write`], [`Context::read`], ...) or call the methods of the
/// fields directly.
///
/// Usually derived:
///
/// ```
/// use og_object::{Codec, Context, Data};
///
/// #[derive(Codec, Default, Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
///     #[codec(skip)]
///     hovered: bool,
/// }
///
/// let mut ctx = Context::new();
/// let mut data = Data::new();
/// ctx.write_to(&mut data, &Point { x: -1, y: 2, hovered: true });
/// assert_eq!(data.as_slice(), &[1, 4]);
///
/// let mut back = Point::default();
/// ctx.read_from(&mut data.reader(), &mut back).unwrap();
/// assert_eq!(back, Point { x: -1, y: 2, hovered: false });
/// assert_eq!(ctx.stringify(&back), r#"{"x":-1,"y":2}"#);
/// ```
pub trait Codec {
    /// The fewest bytes one value can encode to.
    ///
    /// Used to reject a corrupt element count before allocating for it.
    const MIN_WIRE_SIZE: usize = 1;

    /// Appends the binary form.
    fn write_data(&self, ctx: &mut Context, data: &mut Data);

    /// [`write_data`](Codec::write_data) for the value an entry point was
    /// called with.
    #[inline]
    fn write_root(&self, ctx: &mut Context, data: &mut Data) {
        self.write_data(ctx, data);
    }

    /// Decodes in place.
    fn read_data(&mut self, ctx: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError>;

    /// [`read_data`](Codec::read_data) for the value an entry point was
    /// called with.
    #[inline]
    fn read_root(&mut self, ctx: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
        self.read_data(ctx, reader)
    }

    /// Appends the text form.
    fn append_text(&self, ctx: &mut Context, out: &mut String);

    /// Deep-copies `self` into `target`, reusing what `target` already owns
    /// where possible.
    fn clone_data(&self, ctx: &mut Context, target: &mut Self);

    /// Returns the visit index of the first strong handle reached twice
    /// below `self`, `0` if there is none.
    #[inline]
    fn recursive_check(&self, ctx: &mut Context) -> u32 {
        let _ = ctx;
        0
    }

    /// Detaches every strong handle below `self` that is reached twice.
    #[inline]
    fn recursive_reset(&mut self, ctx: &mut Context) {
        let _ = ctx;
    }

    /// Resets to the empty value: zero, empty or null.
    fn set_default_value(&mut self, ctx: &mut Context);
}
