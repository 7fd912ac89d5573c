use alloc::string::String;

use og_ptr::{Strong, Weak};

use super::utils::{clone_new, read_new};
use crate::{Codec, Context, Data, DataReader, ObjPtr, ObjWeak, ObjectKind, ReadError};

// -----------------------------------------------------------------------------
// Strong, Weak

// Plain handles carry no identity on the wire: every non-null handle writes
// its payload, so a payload reached twice is written twice and a cycle of
// plain handles never ends. Use `ObjPtr` for shared or cyclic structure.

impl<T: Codec + Default> Codec for Strong<T> {
    fn write_data(&self, ctx: &mut Context, data: &mut Data) {
        match self.try_borrow() {
            None => data.write_u8(0),
            Some(value) => {
                data.write_u8(1);
                value.write_data(ctx, data);
            }
        }
    }

    fn read_data(&mut self, ctx: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
        match reader.read_u8()? {
            0 => self.reset(),
            1 => {
                if let Some(mut value) = self.try_borrow_mut() {
                    return value.read_data(ctx, reader);
                }
                *self = Strong::new(read_new(ctx, reader)?);
            }
            _ => return Err(ReadError::MalformedScalar),
        }
        Ok(())
    }

    fn append_text(&self, ctx: &mut Context, out: &mut String) {
        match self.try_borrow() {
            None => out.push_str("null"),
            Some(value) => value.append_text(ctx, out),
        }
    }

    fn clone_data(&self, ctx: &mut Context, target: &mut Self) {
        let Some(source) = self.try_borrow() else {
            target.reset();
            return;
        };
        if target.strong_count() == 1
            && !target.ptr_eq(self)
            && let Some(mut slot) = target.try_borrow_mut()
        {
            source.clone_data(ctx, &mut slot);
            return;
        }
        *target = Strong::new(clone_new(ctx, &*source));
    }

    #[inline]
    fn recursive_check(&self, ctx: &mut Context) -> u32 {
        ctx.check_shared(self, |value, ctx| value.recursive_check(ctx))
    }

    #[inline]
    fn recursive_reset(&mut self, ctx: &mut Context) {
        ctx.reset_shared(self, |value, ctx| value.recursive_reset(ctx));
    }

    #[inline]
    fn set_default_value(&mut self, _: &mut Context) {
        self.reset();
    }
}

/// Reads consume the payload and leave the handle null: nothing would own a
/// decoded value.
impl<T: Codec + Default> Codec for Weak<T> {
    #[inline]
    fn write_data(&self, ctx: &mut Context, data: &mut Data) {
        self.upgrade().write_data(ctx, data);
    }

    fn read_data(&mut self, ctx: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
        let mut orphan = Strong::<T>::null();
        orphan.read_data(ctx, reader)?;
        self.reset();
        Ok(())
    }

    #[inline]
    fn append_text(&self, ctx: &mut Context, out: &mut String) {
        self.upgrade().append_text(ctx, out);
    }

    /// The copy observes the same block as `self`.
    #[inline]
    fn clone_data(&self, _: &mut Context, target: &mut Self) {
        target.clone_from(self);
    }

    #[inline]
    fn set_default_value(&mut self, _: &mut Context) {
        self.reset();
    }
}

// -----------------------------------------------------------------------------
// ObjPtr, ObjWeak

impl<K: ?Sized + ObjectKind> Codec for ObjPtr<K> {
    #[inline]
    fn write_data(&self, ctx: &mut Context, data: &mut Data) {
        ctx.write_handle(data, self.as_strong());
    }

    #[inline]
    fn write_root(&self, ctx: &mut Context, data: &mut Data) {
        ctx.write_root_handle(data, self.as_strong());
    }

    #[inline]
    fn read_data(&mut self, ctx: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
        ctx.read_handle(reader, self)
    }

    #[inline]
    fn read_root(&mut self, ctx: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
        ctx.read_root_handle(reader, self)
    }

    #[inline]
    fn append_text(&self, ctx: &mut Context, out: &mut String) {
        ctx.append_handle(out, self.as_strong());
    }

    #[inline]
    fn clone_data(&self, ctx: &mut Context, target: &mut Self) {
        ctx.clone_handle(self, target);
    }

    #[inline]
    fn recursive_check(&self, ctx: &mut Context) -> u32 {
        ctx.check_shared(self.as_strong(), |object, ctx| object.recursive_check(ctx))
    }

    #[inline]
    fn recursive_reset(&mut self, ctx: &mut Context) {
        ctx.reset_shared(self.as_strong_mut(), |object, ctx| object.recursive_reset(ctx));
    }

    #[inline]
    fn set_default_value(&mut self, _: &mut Context) {
        self.reset();
    }
}

impl<K: ?Sized + ObjectKind> Codec for ObjWeak<K> {
    #[inline]
    fn write_data(&self, ctx: &mut Context, data: &mut Data) {
        ctx.write_weak(data, self);
    }

    #[inline]
    fn read_data(&mut self, ctx: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
        ctx.read_weak(reader, self)
    }

    #[inline]
    fn append_text(&self, ctx: &mut Context, out: &mut String) {
        ctx.append_weak(out, self);
    }

    #[inline]
    fn clone_data(&self, ctx: &mut Context, target: &mut Self) {
        ctx.clone_weak(self, target);
    }

    #[inline]
    fn set_default_value(&mut self, _: &mut Context) {
        self.reset();
    }
}

// -----------------------------------------------------------------------------
// Tests
