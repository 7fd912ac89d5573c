use alloc::string::String;
use core::fmt::Write as _;

use crate::{Codec, Context, Data, DataReader, ReadError};

// -----------------------------------------------------------------------------
// Text

/// Appends `text` as a double-quoted string.
///
/// # Examples
///
/// ```
/// let mut out = String::new();
/// og_object::codec::append_escaped(&mut out, "say \"hi\"\n");
/// assert_eq!(out, r#""say \"hi\"\n""#);
/// ```
pub fn append_escaped(out: &mut String, text: &str) {
    out.reserve(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if u32::from(ch) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", u32::from(ch));
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
}

/// Appends `"key":`.
#[inline]
pub fn append_key(out: &mut String, key: &str) {
    append_escaped(out, key);
    out.push(':');
}

// -----------------------------------------------------------------------------
// Counts

#[inline]
pub(super) fn write_count(data: &mut Data, count: usize) {
    data.write_var_u64(count as u64);
}

/// Reads an element count and checks the input can hold that many `T`s.
#[inline]
pub(super) fn read_count<T: Codec>(reader: &mut DataReader<'_>) -> Result<usize, ReadError> {
    let count = reader.read_var::<usize>()?;
    reader.ensure_count(count, T::MIN_WIRE_SIZE)?;
    Ok(count)
}

/// [`read_count`] for key/value pairs.
#[inline]
pub(super) fn read_pair_count<K: Codec, V: Codec>(
    reader: &mut DataReader<'_>,
) -> Result<usize, ReadError> {
    let count = reader.read_var::<usize>()?;
    reader.ensure_count(count, K::MIN_WIRE_SIZE + V::MIN_WIRE_SIZE)?;
    Ok(count)
}

// -----------------------------------------------------------------------------
// Sequences

pub(super) fn write_seq<'a, T: Codec + 'a>(
    ctx: &mut Context,
    data: &mut Data,
    len: usize,
    items: impl Iterator<Item = &'a T>,
) {
    write_count(data, len);
    for item in items {
        item.write_data(ctx, data);
    }
}

pub(super) fn append_seq<'a, T: Codec + 'a>(
    ctx: &mut Context,
    out: &mut String,
    items: impl Iterator<Item = &'a T>,
) {
    out.push('[');
    for (index, item) in items.enumerate() {
        if index > 0 {
            out.push(',');
        }
        item.append_text(ctx, out);
    }
    out.push(']');
}

/// Maps render flattened: `[k0,v0,k1,v1]`.
pub(super) fn append_map<'a, K: Codec + 'a, V: Codec + 'a>(
    ctx: &mut Context,
    out: &mut String,
    entries: impl Iterator<Item = (&'a K, &'a V)>,
) {
    out.push('[');
    for (index, (key, value)) in entries.enumerate() {
        if index > 0 {
            out.push(',');
        }
        key.append_text(ctx, out);
        out.push(',');
        value.append_text(ctx, out);
    }
    out.push(']');
}

pub(super) fn check_seq<'a, T: Codec + 'a>(
    ctx: &mut Context,
    items: impl Iterator<Item = &'a T>,
) -> u32 {
    for item in items {
        let index = item.recursive_check(ctx);
        if index != 0 {
            return index;
        }
    }
    0
}

/// Reads a fresh element, starting from its default value.
#[inline]
pub(super) fn read_new<T: Codec + Default>(
    ctx: &mut Context,
    reader: &mut DataReader<'_>,
) -> Result<T, ReadError> {
    let mut item = T::default();
    item.read_data(ctx, reader)?;
    Ok(item)
}

/// Clones into a fresh element, starting from its default value.
#[inline]
pub(super) fn clone_new<T: Codec + Default>(ctx: &mut Context, source: &T) -> T {
    let mut item = T::default();
    source.clone_data(ctx, &mut item);
    item
}
