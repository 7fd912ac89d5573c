use alloc::boxed::Box;
use alloc::string::String;

use super::utils::{clone_new, read_new};
use crate::{Codec, Context, Data, DataReader, ReadError};

// -----------------------------------------------------------------------------
// Option

impl<T: Codec + Default> Codec for Option<T> {
    fn write_data(&self, ctx: &mut Context, data: &mut Data) {
        match self {
            None => data.write_u8(0),
            Some(value) => {
                data.write_u8(1);
                value.write_data(ctx, data);
            }
        }
    }

    fn read_data(&mut self, ctx: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
        match reader.read_u8()? {
            0 => *self = None,
            1 => match self {
                Some(value) => value.read_data(ctx, reader)?,
                None => *self = Some(read_new(ctx, reader)?),
            },
            _ => return Err(ReadError::MalformedScalar),
        }
        Ok(())
    }

    fn append_text(&self, ctx: &mut Context, out: &mut String) {
        match self {
            None => out.push_str("null"),
            Some(value) => value.append_text(ctx, out),
        }
    }

    fn clone_data(&self, ctx: &mut Context, target: &mut Self) {
        let Some(source) = self else {
            *target = None;
            return;
        };
        match target {
            Some(slot) => source.clone_data(ctx, slot),
            None => *target = Some(clone_new(ctx, source)),
        }
    }

    #[inline]
    fn recursive_check(&self, ctx: &mut Context) -> u32 {
        self.as_ref().map_or(0, |value| value.recursive_check(ctx))
    }

    #[inline]
    fn recursive_reset(&mut self, ctx: &mut Context) {
        if let Some(value) = self {
            value.recursive_reset(ctx);
        }
    }

    #[inline]
    fn set_default_value(&mut self, _: &mut Context) {
        *self = None;
    }
}

// -----------------------------------------------------------------------------
// Box

impl<T: Codec> Codec for Box<T> {
    const MIN_WIRE_SIZE: usize = T::MIN_WIRE_SIZE;

    #[inline]
    fn write_data(&self, ctx: &mut Context, data: &mut Data) {
        (**self).write_data(ctx, data);
    }

    #[inline]
    fn write_root(&self, ctx: &mut Context, data: &mut Data) {
        (**self).write_root(ctx, data);
    }

    #[inline]
    fn read_data(&mut self, ctx: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
        (**self).read_data(ctx, reader)
    }

    #[inline]
    fn read_root(&mut self, ctx: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
        (**self).read_root(ctx, reader)
    }

    #[inline]
    fn append_text(&self, ctx: &mut Context, out: &mut String) {
        (**self).append_text(ctx, out);
    }

    #[inline]
    fn clone_data(&self, ctx: &mut Context, target: &mut Self) {
        (**self).clone_data(ctx, &mut **target);
    }

    #[inline]
    fn recursive_check(&self, ctx: &mut Context) -> u32 {
        (**self).recursive_check(ctx)
    }

    #[inline]
    fn recursive_reset(&mut self, ctx: &mut Context) {
        (**self).recursive_reset(ctx);
    }

    #[inline]
    fn set_default_value(&mut self, ctx: &mut Context) {
        (**self).set_default_value(ctx);
    }
}

// -----------------------------------------------------------------------------
// Tests
