//! Library-wide error and result types.

use std::io;

use thiserror::Error;

/// Result alias used throughout xnbkit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Every variant aborts the decode of the file it was raised for. Messages
/// are kept intentionally terse; callers that need richer context (the
/// file path, the archive entry) should wrap `Error` in their own type.
#[derive(Debug, Error)]
pub enum Error {
    /// A read would run past the end of the buffer.
    #[error("unexpected end of data at offset {offset} (wanted {wanted} bytes)")]
    Truncated { offset: usize, wanted: usize },
    /// A 7-bit encoded integer used more than five bytes or 32 bits.
    #[error("malformed 7-bit encoded integer at offset {0}")]
    BadVarint(usize),
    /// A length-prefixed string was not valid UTF-8.
    #[error("invalid UTF-8 string at offset {0}")]
    InvalidUtf8(usize),
    /// A single UTF-8 encoded character was malformed.
    #[error("invalid UTF-8 character at offset {0}")]
    InvalidChar(usize),
    /// A type name did not follow the assembly-qualified name grammar.
    #[error("bad type name {name:?} at {pos}: {reason}")]
    TypeName {
        name: String,
        pos: usize,
        reason: &'static str,
    },
    /// A magic/signature field did not match the expected value.
    #[error("bad magic value")]
    BadMagic,
    /// The target platform byte is not one this reader knows.
    #[error("unsupported platform: {0:#04x}")]
    UnsupportedPlatform(u8),
    /// A format version is present in the data but not supported by this
    /// parser.
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),
    /// The graphics profile encoded in the attribute byte is unknown.
    #[error("unsupported graphics profile: {0:#04x}")]
    UnsupportedProfile(u8),
    /// The data uses a feature this reader cannot handle.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
    /// The size recorded in a header disagrees with the data.
    #[error("declared size {declared} does not match actual size {actual}")]
    SizeMismatch { declared: usize, actual: usize },
    /// A decompressor produced a different number of bytes than promised.
    #[error("decompressed {actual} bytes, expected {expected}")]
    DecompressedSize { expected: usize, actual: usize },
    /// No reader is registered for a manifest reader tag or target type.
    #[error("type reader not found: {0}")]
    ReaderNotFound(String),
    /// Two builtin readers claim the same tag or target type.
    #[error("duplicate type reader registration: {0}")]
    DuplicateReader(String),
    /// An enum value has no name in the table selected for this file.
    #[error("unknown {type_name} value: {value}")]
    UnknownEnumValue {
        type_name: &'static str,
        value: i32,
    },
    /// A type id in the payload points outside the manifest.
    #[error("type id {id} out of range (manifest has {len} readers)")]
    TypeIdOutOfRange { id: u32, len: usize },
    /// A decoded object was not of the type the caller asked for.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    /// Bytes were left over after the object graph was decoded.
    #[error("{0} bytes of unparsed trailing data")]
    TrailingData(usize),
    /// An offset or size field would read outside the valid region.
    #[error("invalid offset or size")]
    InvalidRange,
    /// A structural constraint was violated (message describes which one).
    #[error("parse error: {0}")]
    Parse(&'static str),
    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// LZ4 decompression failed.
    #[cfg(feature = "compression")]
    #[error("lz4 decompression failed")]
    Lz4,
}
