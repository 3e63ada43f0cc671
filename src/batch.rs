//! Failure-tolerant batch decoding.
//!
//! Files are independent decode sessions that share only the read-only
//! [`Registry`](crate::readers::Registry), so a batch is decoded in
//! parallel on the rayon pool. A file that fails is logged with its name
//! and reported in its [`Outcome`]; it never stops the rest of the batch.

use std::io::{Read, Seek};

use rayon::prelude::*;

use crate::compression::Decompressor;
use crate::formats::pak::PakReader;
use crate::formats::xnb::{Content, MAGIC, Xnb};
use crate::{Error, Result};

/// Result of decoding one named item.
#[derive(Debug)]
pub struct Outcome {
    pub name: String,
    pub result: Result<Content>,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Open and fully decode one file.
pub fn decode_one(bytes: &[u8], decompressor: &dyn Decompressor) -> Result<Content> {
    let mut xnb = Xnb::open_with(bytes, decompressor)?;
    xnb.parse()?;
    xnb.into_content()
        .ok_or(Error::Parse("decode finished without content"))
}

/// Decode every `(name, bytes)` item. Outcomes are in input order.
pub fn decode_all<N, B>(items: &[(N, B)], decompressor: &(dyn Decompressor + Sync)) -> Vec<Outcome>
where
    N: AsRef<str> + Sync,
    B: AsRef<[u8]> + Sync,
{
    items
        .par_iter()
        .map(|(name, bytes)| {
            let name = name.as_ref();
            let result = decode_one(bytes.as_ref(), decompressor);
            if let Err(e) = &result {
                log::warn!("{name}: {e}");
            }
            Outcome {
                name: name.to_owned(),
                result,
            }
        })
        .collect()
}

/// Decode every XNB entry of a pak archive. Entries that do not start
/// with the XNB magic are raw assets and are skipped.
///
/// Entries are read and decoded a few at a time, so only one group of
/// entry buffers is held in memory at once.
///
/// Fails only if the archive itself cannot be read.
pub fn decode_pak<R: Read + Seek>(
    pak: &mut PakReader<R>,
    decompressor: &(dyn Decompressor + Sync),
) -> Result<Vec<Outcome>> {
    let group = rayon::current_num_threads().max(1) * 2;
    decode_pak_grouped(pak, decompressor, group)
}

fn decode_pak_grouped<R: Read + Seek>(
    pak: &mut PakReader<R>,
    decompressor: &(dyn Decompressor + Sync),
    group: usize,
) -> Result<Vec<Outcome>> {
    let entries: Vec<_> = pak.files().cloned().collect();
    let mut outcomes = Vec::with_capacity(entries.len());
    for chunk in entries.chunks(group.max(1)) {
        let mut items = Vec::with_capacity(chunk.len());
        for entry in chunk {
            let data = pak.read_to_vec(entry)?;
            if data.starts_with(MAGIC) {
                items.push((entry.name.clone(), data));
            } else {
                log::debug!("{}: not XNB, skipped", entry.name);
            }
        }
        outcomes.extend(decode_all(&items, decompressor));
    }
    Ok(outcomes)
}
