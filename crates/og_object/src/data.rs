use alloc::vec::Vec;
use core::fmt;

use crate::ReadError;

// -----------------------------------------------------------------------------
// FixedWidth

/// Scalars stored as little-endian fixed-width bytes.
pub trait FixedWidth: Copy {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Appends the little-endian bytes of `self`.
    fn put(self, out: &mut Vec<u8>);

    /// Decodes from exactly [`SIZE`](FixedWidth::SIZE) bytes.
    fn take(bytes: &[u8]) -> Self;
}

macro_rules! impl_fixed_width {
    ($($ty:ty),*) => {$(
        impl FixedWidth for $ty {
            const SIZE: usize = size_of::<$ty>();

            #[inline]
            fn put(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            #[inline]
            fn take(bytes: &[u8]) -> Self {
                let mut buf = [0_u8; size_of::<$ty>()];
                buf.copy_from_slice(&bytes[..size_of::<$ty>()]);
                <$ty>::from_le_bytes(buf)
            }
        }
    )*};
}

impl_fixed_width!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

// -----------------------------------------------------------------------------
// Data

/// A growable byte buffer, the write side of the binary codec.
///
/// Wider integers use LEB128 variable-length encoding (seven bits per byte,
/// high bit set on every byte but the last); signed values are zig-zag
/// mapped first.
///
/// # Examples
///
/// ```
/// use og_object::Data;
///
/// let mut data = Data::new();
/// data.write_var_u64(300);
/// data.write_fixed(1.5_f32);
///
/// assert_eq!(data.as_slice(), &[0xAC, 0x02, 0x00, 0x00, 0xC0, 0x3F]);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Data {
    buf: Vec<u8>,
}

impl Data {
    /// Creates an empty buffer.
    #[inline]
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates an empty buffer with room for `capacity` bytes.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        self.buf.reserve(additional);
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a cursor reading this buffer from the start.
    #[inline]
    pub fn reader(&self) -> DataReader<'_> {
        DataReader::new(&self.buf)
    }

    /// Appends a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Appends a fixed-width little-endian scalar.
    #[inline]
    pub fn write_fixed<T: FixedWidth>(&mut self, value: T) {
        value.put(&mut self.buf);
    }

    /// Appends an unsigned LEB128 integer.
    pub fn write_var_u64(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.buf.push((value as u8) | 0x80);
            value >>= 7;
        }
        self.buf.push(value as u8);
    }

    /// Appends a zig-zag mapped LEB128 integer.
    #[inline]
    pub fn write_var_i64(&mut self, value: i64) {
        self.write_var_u64(((value << 1) ^ (value >> 63)) as u64);
    }

    /// Appends raw bytes without a length prefix.
    #[inline]
    pub fn write_buf(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Appends a length prefix followed by the bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_var_u64(bytes.len() as u64);
        self.write_buf(bytes);
    }
}

impl From<Vec<u8>> for Data {
    #[inline]
    fn from(buf: Vec<u8>) -> Self {
        Self { buf }
    }
}

impl From<Data> for Vec<u8> {
    #[inline]
    fn from(data: Data) -> Self {
        data.buf
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Data({:02x?})", self.buf)
    }
}

// -----------------------------------------------------------------------------
// DataReader

/// A bounds-checked cursor over encoded bytes, the read side of the codec.
///
/// Every read either consumes exactly the bytes it decodes or fails without
/// moving past the end of the input.
#[derive(Clone, Copy)]
pub struct DataReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> DataReader<'a> {
    /// Creates a cursor at the start of `buf`.
    #[inline]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Bytes consumed so far.
    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fails unless at least `needed` bytes are left.
    #[inline]
    pub fn ensure(&self, needed: usize) -> Result<(), ReadError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(ReadError::BufferExhausted { needed, remaining });
        }
        Ok(())
    }

    /// Guards a declared element count before anything is allocated for it.
    ///
    /// Every element is charged at least one byte, so a count never exceeds
    /// the remaining input, even for elements that encode to nothing.
    #[inline]
    pub fn ensure_count(&self, count: usize, min_size: usize) -> Result<(), ReadError> {
        self.ensure(count.saturating_mul(min_size.max(1)))
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    #[inline]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        let bytes = self.read_buf(N)?;
        let mut buf = [0_u8; N];
        buf.copy_from_slice(bytes);
        Ok(buf)
    }

    /// Reads a fixed-width little-endian scalar.
    #[inline]
    pub fn read_fixed<T: FixedWidth>(&mut self) -> Result<T, ReadError> {
        self.read_buf(T::SIZE).map(T::take)
    }

    /// Reads an unsigned LEB128 integer.
    ///
    /// Encodings longer than ten bytes or overflowing 64 bits are malformed.
    pub fn read_var_u64(&mut self) -> Result<u64, ReadError> {
        let mut value = 0_u64;
        let mut shift = 0_u32;
        loop {
            let byte = self.read_u8()?;
            let bits = u64::from(byte & 0x7F);
            if shift == 63 && bits > 1 {
                return Err(ReadError::MalformedScalar);
            }
            value |= bits << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 63 {
                return Err(ReadError::MalformedScalar);
            }
        }
    }

    /// Reads a zig-zag mapped LEB128 integer.
    #[inline]
    pub fn read_var_i64(&mut self) -> Result<i64, ReadError> {
        let raw = self.read_var_u64()?;
        Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
    }

    /// Reads an unsigned integer that must fit in `T`.
    #[inline]
    pub fn read_var<T: TryFrom<u64>>(&mut self) -> Result<T, ReadError> {
        let raw = self.read_var_u64()?;
        T::try_from(raw).map_err(|_| ReadError::MalformedScalar)
    }

    /// Reads a length prefix, checked against the remaining input.
    #[inline]
    pub fn read_len(&mut self) -> Result<usize, ReadError> {
        let len = self.read_var::<usize>()?;
        self.ensure(len)?;
        Ok(len)
    }

    /// Reads `len` raw bytes.
    pub fn read_buf(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        self.ensure(len)?;
        let start = self.offset;
        self.offset += len;
        Ok(&self.buf[start..self.offset])
    }

    /// Reads a length prefix and that many bytes.
    #[inline]
    pub fn read_bytes(&mut self) -> Result<&'a [u8], ReadError> {
        let len = self.read_len()?;
        self.read_buf(len)
    }
}

impl fmt::Debug for DataReader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataReader")
            .field("offset", &self.offset)
            .field("remaining", &self.remaining())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
