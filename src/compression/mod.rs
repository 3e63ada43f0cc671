//! Payload decompression.
//!
//! Compressed XNB files carry their payload in one of two block formats,
//! selected by the attribute byte of the envelope:
//!
//! | Flag   | Method | Handled by |
//! |--------|--------|------------|
//! | `0x80` | LZX    | an external [`Decompressor`] supplied by the caller |
//! | `0x40` | LZ4    | [`lz4`] (requires the `compression` feature) |
//!
//! The envelope parser never implements a compression algorithm itself.
//! It hands the compressed bytes and the declared uncompressed size to a
//! [`Decompressor`] and checks that exactly that many bytes come back.
//!
//! ```toml
//! [dependencies]
//! xnbkit = { version = "0.1", features = ["compression"] }
//! ```

#[cfg(feature = "compression")]
pub mod lz4;

use crate::{Error, Result};

/// Block compression scheme of an XNB payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// XNA's LZX variant (attribute bit `0x80`).
    Lzx,
    /// LZ4 block format (attribute bit `0x40`).
    Lz4,
}

/// Something that can inflate a compressed payload.
///
/// Implementations must return exactly `expected_size` bytes or an error;
/// the caller re-checks the length either way.
pub trait Decompressor {
    fn decompress(&self, method: Compression, data: &[u8], expected_size: usize) -> Result<Vec<u8>>;
}

/// The decompressor used when the caller does not supply one.
///
/// Handles LZ4 when the `compression` feature is enabled; LZX always needs
/// an external implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct Builtin;

impl Decompressor for Builtin {
    fn decompress(&self, method: Compression, data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
        match method {
            #[cfg(feature = "compression")]
            Compression::Lz4 => lz4::decompress_lz4(data, expected_size),
            #[cfg(not(feature = "compression"))]
            Compression::Lz4 => {
                let _ = (data, expected_size);
                Err(Error::Unsupported(
                    "LZ4-compressed content requires the `compression` feature",
                ))
            }
            Compression::Lzx => Err(Error::Unsupported(
                "LZX-compressed content requires an external decompressor",
            )),
        }
    }
}

/// Run `decompressor` and verify the output length.
pub(crate) fn inflate(
    decompressor: &dyn Decompressor,
    method: Compression,
    data: &[u8],
    expected_size: usize,
) -> Result<Vec<u8>> {
    let out = decompressor.decompress(method, data, expected_size)?;
    if out.len() != expected_size {
        return Err(Error::DecompressedSize {
            expected: expected_size,
            actual: out.len(),
        });
    }
    Ok(out)
}
