//! LZ4 decompression (requires the `compression` feature).
//!
//! LZ4-compressed XNB payloads are a single raw LZ4 block with no size
//! prefix of its own; the decompressed size comes from the envelope, so
//! the block is decoded with [`lz4_flex::block::decompress`] directly.

#![cfg(feature = "compression")]

use crate::{Error, Result};

/// Decompress a raw LZ4 block into exactly `expected_size` bytes.
///
/// Returns [`Error::Lz4`] on any decompression failure.
pub fn decompress_lz4(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    lz4_flex::block::decompress(data, expected_size).map_err(|_| Error::Lz4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lz4_block_round_trip() {
        let input = b"xnb xnb xnb xnb xnb xnb xnb xnb".repeat(8);
        let packed = lz4_flex::block::compress(&input);
        let out = decompress_lz4(&packed, input.len()).expect("valid block");
        assert_eq!(out, input);
    }

    #[test]
    fn test_lz4_garbage_fails() {
        assert!(matches!(decompress_lz4(&[0xFF, 0xFF, 0xFF], 64), Err(Error::Lz4)));
    }
}
