//! XNB - compiled content container.
//!
//! One serialized object graph plus the list of type readers needed to
//! decode it.
//!
//! ## Envelope (10 bytes)
//! ```text
//! [0x00] Magic "XNB"                          (3 bytes)
//! [0x03] Platform ('w', 'x' or 'm')           (u8)
//! [0x04] Format version (3, 4 or 5)           (u8)
//! [0x05] Attributes                           (u8)
//!          bit 7     LZX compressed
//!          bit 6     LZ4 compressed (version 5 only)
//!          bits 0-5  graphics profile (version 5 only)
//! [0x06] Total file size, envelope included   (u32 LE)
//! ```
//! A compressed file then stores the decompressed payload size (`u32 LE`)
//! followed by the compressed payload.
//!
//! ## Payload
//! ```text
//! varint                       reader count
//! reader count x { string tag; i32 version }
//! varint                       shared resource count
//! object                       root
//! shared resource count x object
//! ```
//! Every `object` uses the read-object protocol of [`crate::readers`]. The
//! payload must be consumed exactly; leftover bytes mean a reader and the
//! writer disagree about a layout.

use std::fmt;
use std::sync::Arc;

use crate::compression::{self, Builtin, Compression, Decompressor};
use crate::cursor::ByteCursor;
use crate::readers::{ContentInput, InitContext, Registry, TypeReader, Value};
use crate::typename::TypeSpec;
use crate::{Error, Result};

pub const MAGIC: &[u8; 3] = b"XNB";

/// Size of the fixed envelope.
pub const HEADER_SIZE: usize = 10;

const FLAG_LZX: u8 = 0x80;
const FLAG_LZ4: u8 = 0x40;
/// Version 5 graphics profile bits. Bit 6 would belong to the profile in
/// the original 4.0 layout, but later producers use it as [`FLAG_LZ4`], so
/// only the low six bits select the profile.
const PROFILE_MASK: u8 = 0x3F;

/// Platform a file was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Xbox360,
    WindowsPhone,
}

impl Platform {
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            b'w' => Ok(Self::Windows),
            b'x' => Ok(Self::Xbox360),
            b'm' => Ok(Self::WindowsPhone),
            other => Err(Error::UnsupportedPlatform(other)),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Windows => b'w',
            Self::Xbox360 => b'x',
            Self::WindowsPhone => b'm',
        }
    }
}

/// Graphics profile of a version 5 file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Reach,
    HiDef,
}

/// Parsed envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub platform: Platform,
    pub version: u8,
    /// Present for version 5 files only.
    pub profile: Option<Profile>,
    pub compression: Option<Compression>,
    /// Declared size of the whole file.
    pub file_size: u32,
}

impl Header {
    /// Parse and validate the envelope of `buf`, which must be the whole
    /// file.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut c = ByteCursor::new(buf);
        if c.read_bytes(MAGIC.len())? != MAGIC {
            return Err(Error::BadMagic);
        }
        let platform = Platform::from_code(c.read_u8()?)?;
        let version = c.read_u8()?;
        if !(3..=5).contains(&version) {
            return Err(Error::UnsupportedVersion(version));
        }
        let attributes = c.read_u8()?;
        let file_size = c.read_u32()?;
        if file_size as usize != buf.len() {
            return Err(Error::SizeMismatch {
                declared: file_size as usize,
                actual: buf.len(),
            });
        }

        let profile = if version >= 5 {
            match attributes & PROFILE_MASK {
                0 => Some(Profile::Reach),
                1 => Some(Profile::HiDef),
                other => return Err(Error::UnsupportedProfile(other)),
            }
        } else {
            None
        };

        let lz4 = version >= 5 && attributes & FLAG_LZ4 != 0;
        let compression = match (attributes & FLAG_LZX != 0, lz4) {
            (false, false) => None,
            (true, false) => Some(Compression::Lzx),
            (false, true) => Some(Compression::Lz4),
            (true, true) => return Err(Error::Unsupported("both compression flags set")),
        };

        Ok(Self {
            platform,
            version,
            profile,
            compression,
            file_size,
        })
    }
}

/// Where a decode session is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Envelope checked, payload not yet decoded.
    HeaderValidated,
    Decoded,
    /// Decoding failed; the session is unusable.
    Discarded,
}

/// One line of the reader manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub reader_tag: String,
    pub version: i32,
}

/// Everything a successful decode produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub manifest: Vec<ManifestEntry>,
    /// Target type of the root object's reader, if the root is not null.
    pub root_type: Option<String>,
    pub root: Option<Value>,
    pub shared: Vec<Option<Value>>,
}

/// A decode session over one file.
///
/// [`open`](Self::open) checks the envelope and decompresses the payload.
/// The first `parse*` call decodes it; later calls return the same
/// [`Content`]. A failed decode discards the session.
pub struct Xnb {
    header: Header,
    state: State,
    payload: Vec<u8>,
    content: Option<Content>,
}

impl fmt::Debug for Xnb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Xnb")
            .field("header", &self.header)
            .field("state", &self.state)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

impl Xnb {
    /// Open a file using the builtin decompressor.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        Self::open_with(bytes, &Builtin)
    }

    /// Open a file, inflating compressed payloads with `decompressor`.
    pub fn open_with(bytes: &[u8], decompressor: &dyn Decompressor) -> Result<Self> {
        let header = Header::parse(bytes)?;
        let mut c = ByteCursor::new(bytes);
        c.seek(HEADER_SIZE)?;

        let payload = match header.compression {
            None => c.take_remainder().to_vec(),
            Some(method) => {
                let size = c.read_u32()? as usize;
                let data = c.take_remainder();
                log::debug!(
                    "inflating {} {method:?} bytes to {size}",
                    data.len()
                );
                compression::inflate(decompressor, method, data, size)?
            }
        };

        log::debug!(
            "XNB {:?} v{} profile {:?}, payload {} bytes",
            header.platform,
            header.version,
            header.profile,
            payload.len()
        );

        Ok(Self {
            header,
            state: State::HeaderValidated,
            payload,
            content: None,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Decode with the process-wide builtin registry.
    pub fn parse(&mut self) -> Result<&Content> {
        self.parse_in(Registry::global(), None)
    }

    /// Decode, requiring the root object to be of `expected_type`.
    pub fn parse_as(&mut self, expected_type: &str) -> Result<&Content> {
        self.parse_in(Registry::global(), Some(expected_type))
    }

    /// Decode with an explicit registry and optional expected root type.
    pub fn parse_in(&mut self, registry: &Registry, expected_type: Option<&str>) -> Result<&Content> {
        let expected = expected_type
            .map(|t| TypeSpec::parse(t).map(|s| s.full_name()))
            .transpose()?;

        match self.state {
            State::Decoded => {
                let content = self
                    .content
                    .as_ref()
                    .ok_or(Error::Parse("decoded session lost its content"))?;
                check_root_type(content.root_type.as_deref(), expected.as_deref())?;
                return Ok(content);
            }
            State::Discarded => return Err(Error::Parse("decode session was discarded")),
            State::HeaderValidated => {}
        }

        let payload = std::mem::take(&mut self.payload);
        match decode(&payload, &self.header, registry, expected.as_deref()) {
            Ok(content) => {
                self.state = State::Decoded;
                Ok(self.content.insert(content))
            }
            Err(e) => {
                self.state = State::Discarded;
                Err(e)
            }
        }
    }

    /// Take the decoded content, if any.
    pub fn into_content(self) -> Option<Content> {
        self.content
    }
}

fn check_root_type(found: Option<&str>, expected: Option<&str>) -> Result<()> {
    match (found, expected) {
        (Some(found), Some(expected)) if found != expected => Err(Error::TypeMismatch {
            expected: expected.to_owned(),
            found: found.to_owned(),
        }),
        _ => Ok(()),
    }
}

fn decode(payload: &[u8], header: &Header, registry: &Registry, expected: Option<&str>) -> Result<Content> {
    let mut cursor = ByteCursor::new(payload);

    let count = cursor.read_varint()? as usize;
    let capacity = count.min(cursor.remaining());
    let mut manifest = Vec::with_capacity(capacity);
    let mut readers: Vec<Arc<dyn TypeReader>> = Vec::with_capacity(capacity);
    for index in 0..count {
        let reader_tag = cursor.read_string()?;
        let version = cursor.read_i32()?;
        log::debug!("reader {}: {reader_tag} (version {version})", index + 1);
        readers.push(registry.resolve_by_tag(&reader_tag)?);
        manifest.push(ManifestEntry { reader_tag, version });
    }

    let cx = InitContext {
        registry,
        platform: header.platform,
        version: header.version,
    };
    for reader in &readers {
        reader.init(&cx)?;
    }

    let shared_count = cursor.read_varint()? as usize;
    let mut input = ContentInput::new(cursor, &readers, header.platform, header.version);

    let root_reader = input.read_type_id()?;
    let root_type = root_reader.map(|r| r.target_type().to_owned());
    check_root_type(root_type.as_deref(), expected)?;
    let root = match root_reader {
        Some(reader) => Some(input.read_raw(reader.as_ref())?),
        None => None,
    };

    if shared_count > 0 {
        log::warn!("file declares {shared_count} shared resources");
    }
    let mut shared = Vec::with_capacity(input.capacity_for(shared_count));
    for _ in 0..shared_count {
        shared.push(input.read_object()?);
    }

    let trailing = input.remaining();
    if trailing != 0 {
        return Err(Error::TrailingData(trailing));
    }

    Ok(Content {
        manifest,
        root_type,
        root,
        shared,
    })
}
