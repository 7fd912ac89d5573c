use alloc::string::String;
use core::fmt::Write as _;

use super::utils::append_escaped;
use crate::{Codec, Context, Data, DataReader, ReadError};

// -----------------------------------------------------------------------------
// Fixed width

macro_rules! impl_fixed {
    ($($ty:ty),*) => {$(
        impl Codec for $ty {
            const MIN_WIRE_SIZE: usize = size_of::<$ty>();

            #[inline]
            fn write_data(&self, _: &mut Context, data: &mut Data) {
                data.write_fixed(*self);
            }

            #[inline]
            fn read_data(&mut self, _: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
                *self = reader.read_fixed()?;
                Ok(())
            }

            #[inline]
            fn append_text(&self, _: &mut Context, out: &mut String) {
                let _ = write!(out, "{self}");
            }

            #[inline]
            fn clone_data(&self, _: &mut Context, target: &mut Self) {
                *target = *self;
            }

            #[inline]
            fn set_default_value(&mut self, _: &mut Context) {
                *self = 0 as $ty;
            }
        }
    )*};
}

impl_fixed!(u8, i8, f32, f64);

// -----------------------------------------------------------------------------
// Variable length

macro_rules! impl_var_unsigned {
    ($($ty:ty),*) => {$(
        impl Codec for $ty {
            #[inline]
            fn write_data(&self, _: &mut Context, data: &mut Data) {
                data.write_var_u64(*self as u64);
            }

            #[inline]
            fn read_data(&mut self, _: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
                *self = reader.read_var()?;
                Ok(())
            }

            #[inline]
            fn append_text(&self, _: &mut Context, out: &mut String) {
                let _ = write!(out, "{self}");
            }

            #[inline]
            fn clone_data(&self, _: &mut Context, target: &mut Self) {
                *target = *self;
            }

            #[inline]
            fn set_default_value(&mut self, _: &mut Context) {
                *self = 0;
            }
        }
    )*};
}

macro_rules! impl_var_signed {
    ($($ty:ty),*) => {$(
        impl Codec for $ty {
            #[inline]
            fn write_data(&self, _: &mut Context, data: &mut Data) {
                data.write_var_i64(*self as i64);
            }

            #[inline]
            fn read_data(&mut self, _: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
                let raw = reader.read_var_i64()?;
                *self = <$ty>::try_from(raw).map_err(|_| ReadError::MalformedScalar)?;
                Ok(())
            }

            #[inline]
            fn append_text(&self, _: &mut Context, out: &mut String) {
                let _ = write!(out, "{self}");
            }

            #[inline]
            fn clone_data(&self, _: &mut Context, target: &mut Self) {
                *target = *self;
            }

            #[inline]
            fn set_default_value(&mut self, _: &mut Context) {
                *self = 0;
            }
        }
    )*};
}

impl_var_unsigned!(u16, u32, u64, usize);
impl_var_signed!(i16, i32, i64, isize);

// -----------------------------------------------------------------------------
// bool, char, unit

impl Codec for bool {
    #[inline]
    fn write_data(&self, _: &mut Context, data: &mut Data) {
        data.write_u8(u8::from(*self));
    }

    #[inline]
    fn read_data(&mut self, _: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
        *self = match reader.read_u8()? {
            0 => false,
            1 => true,
            _ => return Err(ReadError::MalformedScalar),
        };
        Ok(())
    }

    #[inline]
    fn append_text(&self, _: &mut Context, out: &mut String) {
        out.push_str(if *self { "true" } else { "false" });
    }

    #[inline]
    fn clone_data(&self, _: &mut Context, target: &mut Self) {
        *target = *self;
    }

    #[inline]
    fn set_default_value(&mut self, _: &mut Context) {
        *self = false;
    }
}

/// Stored as its code point.
impl Codec for char {
    #[inline]
    fn write_data(&self, _: &mut Context, data: &mut Data) {
        data.write_var_u64(u64::from(u32::from(*self)));
    }

    fn read_data(&mut self, _: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
        let code = reader.read_var::<u32>()?;
        *self = char::from_u32(code).ok_or(ReadError::MalformedScalar)?;
        Ok(())
    }

    fn append_text(&self, _: &mut Context, out: &mut String) {
        let mut buf = [0_u8; 4];
        append_escaped(out, self.encode_utf8(&mut buf));
    }

    #[inline]
    fn clone_data(&self, _: &mut Context, target: &mut Self) {
        *target = *self;
    }

    #[inline]
    fn set_default_value(&mut self, _: &mut Context) {
        *self = '\0';
    }
}

impl Codec for () {
    const MIN_WIRE_SIZE: usize = 0;

    #[inline]
    fn write_data(&self, _: &mut Context, _: &mut Data) {}

    #[inline]
    fn read_data(&mut self, _: &mut Context, _: &mut DataReader<'_>) -> Result<(), ReadError> {
        Ok(())
    }

    #[inline]
    fn append_text(&self, _: &mut Context, out: &mut String) {
        out.push_str("null");
    }

    #[inline]
    fn clone_data(&self, _: &mut Context, _: &mut Self) {}

    #[inline]
    fn set_default_value(&mut self, _: &mut Context) {}
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::{Context, Data, ReadError};

    #[test]
    fn widths() {
        let mut ctx = Context::new();
        let mut data = Data::new();
        ctx.write_to(&mut data, &(7_u8, -1_i8, 300_u16, -2_i64, 1.0_f32, true));
        assert_eq!(
            data.as_slice(),
            &[7, 0xFF, 0xAC, 0x02, 3, 0x00, 0x00, 0x80, 0x3F, 1],
        );
    }

    #[test]
    fn narrowing_is_malformed() {
        let mut ctx = Context::new();
        let mut data = Data::new();
        ctx.write_to(&mut data, &70_000_u32);

        let mut narrow = 0_u16;
        let err = ctx.read_from(&mut data.reader(), &mut narrow).unwrap_err();
        assert_eq!(err, ReadError::MalformedScalar);
        assert!(ctx.is_idle());

        let mut flag = false;
        let err = ctx.read_from(&mut Data::from(vec![2]).reader(), &mut flag).unwrap_err();
        assert_eq!(err, ReadError::MalformedScalar);

        let mut ch = ' ';
        let err = ctx.read_from(&mut Data::from(vec![0x80, 0xB0, 0x03]).reader(), &mut ch).unwrap_err();
        assert_eq!(err, ReadError::MalformedScalar);
    }

    #[test]
    fn text() {
        let mut ctx = Context::new();
        assert_eq!(ctx.stringify(&(-3_i32, 2.5_f64, 'q', false)), r#"[-3,2.5,"q",false]"#);
    }
}
