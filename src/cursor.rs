//! Bounds-checked primitive reader over an in-memory buffer.
//!
//! [`ByteCursor`] is what every type reader works against: fixed-width
//! integers and floats in a selectable byte order, the 7-bit encoded
//! integers used for counts and type ids, length-prefixed UTF-8 strings and
//! raw byte slices. Every read either returns exactly what it promises or
//! fails with [`Error::Truncated`]; nothing is read past the end.
//!
//! [`ByteWriter`] is the matching little-endian writer. The library itself
//! never encodes content; the writer exists to build payloads in memory.

use crate::{Error, Result};

/// Byte order of multi-byte reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// Generate fixed-width read methods for primitive types.
macro_rules! impl_read {
    ($name:ident, $ty:ty) => {
        #[doc = concat!("Read one `", stringify!($ty), "` in the cursor's byte order.")]
        #[inline]
        pub fn $name(&mut self) -> Result<$ty> {
            let b = self.array::<{ size_of::<$ty>() }>()?;
            Ok(match self.endian {
                Endian::Little => <$ty>::from_le_bytes(b),
                Endian::Big => <$ty>::from_be_bytes(b),
            })
        }
    };
}

/// Sequential reader over a borrowed byte buffer.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ByteCursor<'a> {
    /// Create a little-endian cursor positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_endian(buf, Endian::Little)
    }

    pub fn with_endian(buf: &'a [u8], endian: Endian) -> Self {
        Self {
            buf,
            pos: 0,
            endian,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Switch the byte order for all following reads.
    ///
    /// Only meaningful right after a leading magic has been sniffed; the
    /// order must not change once structured reads have started.
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Current offset from the start of the buffer.
    pub fn tell(&self) -> usize {
        self.pos
    }

    /// Move to an absolute offset. Seeking to the very end is allowed.
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.buf.len() {
            return Err(Error::InvalidRange);
        }
        self.pos = offset;
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Return the next `n` bytes without advancing.
    pub fn peek(&self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|&e| e <= self.buf.len());
        match end {
            Some(end) => Ok(&self.buf[self.pos..end]),
            None => Err(Error::Truncated {
                offset: self.pos,
                wanted: n,
            }),
        }
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let slice = self.peek(n)?;
        self.pos += n;
        Ok(slice)
    }

    /// Consume and return everything up to the end of the buffer.
    pub fn take_remainder(&mut self) -> &'a [u8] {
        let rest = &self.buf[self.pos..];
        self.pos = self.buf.len();
        rest
    }

    /// Read exactly `N` bytes into a fixed-size array.
    #[inline]
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut b = [0u8; N];
        b.copy_from_slice(self.read_bytes(N)?);
        Ok(b)
    }

    impl_read!(read_u8, u8);
    impl_read!(read_i8, i8);
    impl_read!(read_u16, u16);
    impl_read!(read_i16, i16);
    impl_read!(read_u32, u32);
    impl_read!(read_i32, i32);
    impl_read!(read_u64, u64);
    impl_read!(read_i64, i64);
    impl_read!(read_f32, f32);
    impl_read!(read_f64, f64);

    /// Read a one-byte boolean. Any non-zero byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read a 7-bit encoded unsigned integer.
    ///
    /// Each byte carries seven value bits, least significant group first;
    /// the high bit says another byte follows. At most five bytes are
    /// accepted and the fifth may only carry the top four bits of a `u32`.
    pub fn read_varint(&mut self) -> Result<u32> {
        let start = self.pos;
        let mut value = 0u32;
        for shift in (0..28).step_by(7) {
            let b = self.read_u8()?;
            value |= ((b & 0x7F) as u32) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        let b = self.read_u8()?;
        if b > 0x0F {
            return Err(Error::BadVarint(start));
        }
        Ok(value | (b as u32) << 28)
    }

    /// Read a 7-bit length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_varint()? as usize;
        let start = self.pos;
        let bytes = self.read_bytes(len)?;
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_owned()),
            Err(_) => Err(Error::InvalidUtf8(start)),
        }
    }

    /// Read a single UTF-8 encoded character.
    ///
    /// The lead byte's run of high one-bits gives the sequence length.
    pub fn read_char(&mut self) -> Result<char> {
        let start = self.pos;
        let lead = self.read_u8()?;
        let len = match lead.leading_ones() {
            0 => 1,
            n @ 2..=4 => n as usize,
            _ => return Err(Error::InvalidChar(start)),
        };
        let mut b = [lead, 0, 0, 0];
        b[1..len].copy_from_slice(self.read_bytes(len - 1)?);
        std::str::from_utf8(&b[..len])
            .ok()
            .and_then(|s| s.chars().next())
            .ok_or(Error::InvalidChar(start))
    }
}

/// Little-endian writer producing the encodings [`ByteCursor`] reads.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

macro_rules! impl_write {
    ($name:ident, $ty:ty) => {
        pub fn $name(&mut self, value: $ty) -> &mut Self {
            self.buf.extend_from_slice(&value.to_le_bytes());
            self
        }
    };
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    impl_write!(write_u8, u8);
    impl_write!(write_i8, i8);
    impl_write!(write_u16, u16);
    impl_write!(write_i16, i16);
    impl_write!(write_u32, u32);
    impl_write!(write_i32, i32);
    impl_write!(write_u64, u64);
    impl_write!(write_i64, i64);
    impl_write!(write_f32, f32);
    impl_write!(write_f64, f64);

    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.write_u8(value as u8)
    }

    pub fn write_varint(&mut self, mut value: u32) -> &mut Self {
        while value >= 0x80 {
            self.buf.push(value as u8 | 0x80);
            value >>= 7;
        }
        self.buf.push(value as u8);
        self
    }

    pub fn write_string(&mut self, s: &str) -> &mut Self {
        self.write_varint(s.len() as u32);
        self.write_bytes(s.as_bytes())
    }

    pub fn write_char(&mut self, c: char) -> &mut Self {
        let mut b = [0u8; 4];
        self.write_bytes(c.encode_utf8(&mut b).as_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}
