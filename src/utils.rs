//! Stream primitives for readers that work on [`Read`] rather than on an
//! in-memory buffer.
//!
//! Each function reads exactly the bytes it promises or returns an error -
//! there is no partial-read ambiguity. Encodings match
//! [`ByteCursor`](crate::cursor::ByteCursor).

use std::io::Read;

use crate::{Error, Result};

/// Read one byte.
#[inline]
pub(crate) fn u8<R: Read>(r: &mut R) -> Result<u8> {
    let mut b = [0u8; 1];
    r.read_exact(&mut b)?;
    Ok(b[0])
}

/// Read a little-endian `i32`.
#[inline]
pub(crate) fn le_i32<R: Read>(r: &mut R) -> Result<i32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(i32::from_le_bytes(b))
}

/// Read exactly `len` bytes into a `Vec`.
#[inline]
pub(crate) fn bytesv<R: Read>(r: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut b = vec![0u8; len];
    r.read_exact(&mut b)?;
    Ok(b)
}

/// Read a 7-bit encoded `u32`. `offset` is only used for error reporting.
pub(crate) fn varint<R: Read>(r: &mut R, offset: usize) -> Result<u32> {
    let mut value = 0u32;
    for shift in (0..28).step_by(7) {
        let b = u8(r)?;
        value |= ((b & 0x7F) as u32) << shift;
        if b & 0x80 == 0 {
            return Ok(value);
        }
    }
    let b = u8(r)?;
    if b > 0x0F {
        return Err(Error::BadVarint(offset));
    }
    Ok(value | (b as u32) << 28)
}

/// Read a 7-bit length-prefixed UTF-8 string.
pub(crate) fn string<R: Read>(r: &mut R, offset: usize) -> Result<String> {
    let len = varint(r, offset)? as usize;
    String::from_utf8(bytesv(r, len)?).map_err(|_| Error::InvalidUtf8(offset))
}
