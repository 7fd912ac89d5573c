use alloc::string::String;
use core::fmt::Write as _;

use super::utils::append_escaped;
use crate::{Codec, Context, Data, DataReader, ReadError};

// -----------------------------------------------------------------------------
// String

impl Codec for String {
    #[inline]
    fn write_data(&self, _: &mut Context, data: &mut Data) {
        data.write_bytes(self.as_bytes());
    }

    fn read_data(&mut self, _: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
        let bytes = reader.read_bytes()?;
        let text = core::str::from_utf8(bytes).map_err(|_| ReadError::InvalidUtf8)?;
        self.clear();
        self.push_str(text);
        Ok(())
    }

    #[inline]
    fn append_text(&self, _: &mut Context, out: &mut String) {
        append_escaped(out, self);
    }

    #[inline]
    fn clone_data(&self, _: &mut Context, target: &mut Self) {
        target.clone_from(self);
    }

    #[inline]
    fn set_default_value(&mut self, _: &mut Context) {
        self.clear();
    }
}

// -----------------------------------------------------------------------------
// Data

/// A byte span; the text form is a lowercase hex string.
impl Codec for Data {
    #[inline]
    fn write_data(&self, _: &mut Context, data: &mut Data) {
        data.write_bytes(self.as_slice());
    }

    fn read_data(&mut self, _: &mut Context, reader: &mut DataReader<'_>) -> Result<(), ReadError> {
        let bytes = reader.read_bytes()?;
        self.clear();
        self.write_buf(bytes);
        Ok(())
    }

    fn append_text(&self, _: &mut Context, out: &mut String) {
        out.reserve(self.len() * 2 + 2);
        out.push('"');
        for byte in self.as_slice() {
            let _ = write!(out, "{byte:02x}");
        }
        out.push('"');
    }

    #[inline]
    fn clone_data(&self, _: &mut Context, target: &mut Self) {
        target.clone_from(self);
    }

    #[inline]
    fn set_default_value(&mut self, _: &mut Context) {
        self.clear();
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::{Context, Data, ReadError};

    #[test]
    fn length_prefixed() {
        let mut ctx = Context::new();
        let mut data = Data::new();
        ctx.write_to(&mut data, &String::from("hé"));
        assert_eq!(data.as_slice(), &[3, b'h', 0xC3, 0xA9]);

        let mut back = String::from("old contents");
        ctx.read_from(&mut data.reader(), &mut back).unwrap();
        assert_eq!(back, "hé");
    }

    #[test]
    fn corrupt_input() {
        let mut ctx = Context::new();
        let mut text = String::new();

        let err = ctx.read_from(&mut Data::from(vec![2, 0xFF, 0xFE]).reader(), &mut text).unwrap_err();
        assert_eq!(err, ReadError::InvalidUtf8);

        let err = ctx.read_from(&mut Data::from(vec![9, b'a']).reader(), &mut text).unwrap_err();
        assert_eq!(err, ReadError::BufferExhausted { needed: 9, remaining: 1 });
    }

    #[test]
    fn text_forms() {
        let mut ctx = Context::new();
        let bytes = Data::from(vec![0x00, 0xAB]);
        assert_eq!(ctx.stringify(&(String::from("a\"b\\"), bytes)), r#"["a\"b\\","00ab"]"#);
    }
}
