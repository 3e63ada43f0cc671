//! Pak - flat named blob table.
//!
//! Bundles XNB files and raw asset payloads (audio, images) into one file.
//! Entries are stored back to back with their data inline; there is no
//! separate index.
//!
//! ## Layout
//! ```text
//! [0x00] EntryCount               (i32 LE)
//! EntryCount x {
//!        Name    (varint length + UTF-8)
//!        Length  (i32 LE)
//!        Data    (Length bytes)
//! }
//! ```
//!
//! ## Notes
//! * Names are stored as the packer saw them, usually with backslashes.
//!   Use [`normalize_name`] before comparing against a path.
//! * A negative count or length, or data running past the end of the
//!   stream, is [`Error::InvalidRange`].

use std::io::{Read, Seek, SeekFrom, Take};
use std::ops::Index;

use crate::utils::{bytesv, le_i32, string};
use crate::{Error, Result};

/// Parsed blob table (metadata only).
///
/// Entry data is accessed via [`PakReader`].
#[derive(Debug, Clone)]
pub struct Pak {
    /// All entries in stored order.
    pub entries: Vec<PakEntry>,
}

/// One named blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PakEntry {
    /// Name exactly as stored.
    pub name: String,
    /// Absolute offset of the data within the stream.
    pub offset: u64,
    pub size: u64,
}

/// Canonical form of an entry name: forward slashes, lower case.
pub fn normalize_name(name: &str) -> String {
    name.replace('\\', "/").to_lowercase()
}

impl Pak {
    /// Parse the blob table from `r`, which must be positioned at its
    /// start. Blob data is skipped, not read.
    pub fn parse<R: Read + Seek>(r: &mut R) -> Result<Self> {
        let base = r.stream_position()?;
        let end = r.seek(SeekFrom::End(0))?;
        r.seek(SeekFrom::Start(base))?;

        let count = le_i32(r)?;
        let count = usize::try_from(count).map_err(|_| Error::InvalidRange)?;

        // Every entry takes at least five bytes.
        let mut entries = Vec::with_capacity(count.min((end.saturating_sub(base) / 5) as usize));
        for _ in 0..count {
            let at = r.stream_position()? as usize;
            let name = string(r, at)?;
            let size = u64::try_from(le_i32(r)?).map_err(|_| Error::InvalidRange)?;
            let offset = r.stream_position()?;
            let next = offset.checked_add(size).filter(|&n| n <= end).ok_or(Error::InvalidRange)?;
            r.seek(SeekFrom::Start(next))?;
            entries.push(PakEntry { name, offset, size });
        }

        log::debug!("pak: {} entries", entries.len());
        Ok(Self { entries })
    }
}

/// Streaming reader wrapper around a [`Pak`].
///
/// Owns the underlying reader and provides bounded access to entry data
/// via [`Take<&mut R>`].
pub struct PakReader<R> {
    inner: R,
    /// Parsed metadata.
    pub pak: Pak,
}

impl<R: Read + Seek> PakReader<R> {
    /// Parse the table and wrap the provided reader.
    pub fn new(mut reader: R) -> Result<Self> {
        let pak = Pak::parse(&mut reader)?;
        Ok(Self { inner: reader, pak })
    }

    /// Open an entry for streaming access.
    ///
    /// The borrow ends when the [`Take`] is dropped.
    pub fn read_file(&mut self, entry: &PakEntry) -> Result<Take<&mut R>> {
        self.inner.seek(SeekFrom::Start(entry.offset))?;
        Ok(self.inner.by_ref().take(entry.size))
    }

    /// Read an entry's data in full.
    pub fn read_to_vec(&mut self, entry: &PakEntry) -> Result<Vec<u8>> {
        let mut file = self.read_file(entry)?;
        bytesv(&mut file, entry.size as usize)
    }

    /// Iterate over all entries.
    pub fn files(&self) -> impl Iterator<Item = &PakEntry> {
        self.pak.entries.iter()
    }

    /// Find an entry by name. Both sides are normalized before comparing.
    pub fn get_file_by_name(&self, name: &str) -> Option<&PakEntry> {
        let wanted = normalize_name(name);
        self.pak
            .entries
            .iter()
            .find(|e| normalize_name(&e.name) == wanted)
    }

    /// Consume the reader, returning the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Index<&str> for PakReader<R> {
    type Output = PakEntry;

    /// Index by entry name.
    ///
    /// # Panics
    /// Panics if no entry has that name.
    fn index(&self, index: &str) -> &Self::Output {
        self.get_file_by_name(index)
            .unwrap_or_else(|| panic!("no entry '{index}' in pak"))
    }
}
