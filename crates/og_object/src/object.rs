use alloc::string::String;
use core::any::Any;
use core::fmt::Write as _;

use crate::{Context, Data, DataReader, ObjPtr, ReadError};

// -----------------------------------------------------------------------------
// Object

/// The capability set of a polymorphic payload.
///
/// Every graph algorithm of [`Context`] reaches an object through these
/// methods once it has resolved the handle pointing at it. Implementations
/// are normally generated by `#[derive(Object)]`, they forward each call to
/// the [`Codec`](crate::Codec) implementation of every field in
/// declaration order.
pub trait Object: Any {
    /// The registered type id of the concrete type.
    fn type_id_of(&self) -> u16;

    /// Allocates a default value of the same concrete type.
    fn create_default(&self) -> ObjPtr;

    /// Writes the fields.
    fn write(&self, ctx: &mut Context, data: &mut Data);

    /// Reads the fields in place.
    fn read(&mut self, ctx: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError>;

    /// Appends the text form, braces included.
    fn append(&self, ctx: &mut Context, out: &mut String) {
        let _ = write!(out, "{{\"__typeId__\":{}", self.type_id_of());
        self.append_core(ctx, out);
        out.push('}');
    }

    /// Appends `,"field":value` for every field.
    fn append_core(&self, ctx: &mut Context, out: &mut String);

    /// Deep-copies the fields into `target`.
    ///
    /// `target` always has the same concrete type as `self`.
    fn clone_to(&self, ctx: &mut Context, target: &mut dyn Object);

    /// Returns the visit index of the first handle found twice, `0` if the
    /// strong handles below this object form a tree.
    fn recursive_check(&self, ctx: &mut Context) -> u32;

    /// Forwards the cycle break to every field.
    fn recursive_reset(&mut self, ctx: &mut Context);

    /// Resets every field to its empty value.
    fn set_default(&mut self, ctx: &mut Context);
}

// -----------------------------------------------------------------------------
// ObjectKind

/// A node of the type hierarchy.
///
/// Concrete object types and abstract kinds that only exist as parents both
/// implement this trait. `dyn Object` is the root with id `0`.
///
/// # Examples
///
/// ```
/// use og_object::{Object, ObjectKind};
///
/// /// A kind that concrete shapes name as their parent.
/// pub struct Shape;
///
/// impl ObjectKind for Shape {
///     const TYPE_ID: u16 = 100;
///     const PARENT_ID: u16 = <dyn Object as ObjectKind>::TYPE_ID;
///     const NAME: &'static str = "Shape";
/// }
/// ```
pub trait ObjectKind: 'static {
    /// Stable nonzero id, `0` only for the root.
    const TYPE_ID: u16;
    /// Id of the parent kind, `0` when the parent is the root.
    const PARENT_ID: u16;
    /// Name used in logs.
    const NAME: &'static str;
}

impl ObjectKind for dyn Object {
    const TYPE_ID: u16 = 0;
    const PARENT_ID: u16 = 0;
    const NAME: &'static str = "Object";
}

// -----------------------------------------------------------------------------
// ObjectType

/// A concrete, constructible object type.
pub trait ObjectType: Object + ObjectKind + Default {
    /// Set for types without any handle below them; such roots skip the
    /// visit bookkeeping.
    const TRIVIAL: bool = false;
}
