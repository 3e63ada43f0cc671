//! Raw export of decoded values.
//!
//! Only some content has a natural standalone file form. [`raw_export`]
//! returns `None` for everything else, so callers check before writing.
//!
//! | Value | Extension | Contents |
//! |-------|-----------|----------|
//! | [`Value::SoundEffect`] | `wav` | RIFF/WAVE built from the stored format header and samples |
//! | [`Value::Effect`] | `fxo` | compiled effect bytecode as stored |

use std::fs;
use std::path::Path;

use crate::Result;
use crate::cursor::ByteWriter;
use crate::readers::Value;
use crate::readers::value::SoundEffect;

/// A value rendered as a standalone file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExport {
    /// File extension, without the dot.
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

impl RawExport {
    /// Write to `path` with the extension replaced by [`Self::extension`].
    /// Returns the path written.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<std::path::PathBuf> {
        let path = path.as_ref().with_extension(self.extension);
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Export `value` if it has a raw file form.
pub fn raw_export(value: &Value) -> Option<RawExport> {
    match value {
        Value::SoundEffect(sound) => Some(RawExport {
            extension: "wav",
            bytes: wav(sound),
        }),
        Value::Effect(code) => Some(RawExport {
            extension: "fxo",
            bytes: code.clone(),
        }),
        _ => None,
    }
}

// RIFF <size> WAVE, "fmt " chunk holding the stored WAVEFORMATEX, "data"
// chunk holding the samples. Odd-sized chunks are padded to even length.
fn wav(sound: &SoundEffect) -> Vec<u8> {
    let fmt_len = sound.format.len() as u32;
    let data_len = sound.data.len() as u32;
    let riff_len = 4 + 8 + fmt_len + (fmt_len & 1) + 8 + data_len + (data_len & 1);

    let mut w = ByteWriter::new();
    w.write_bytes(b"RIFF").write_u32(riff_len).write_bytes(b"WAVE");
    w.write_bytes(b"fmt ").write_u32(fmt_len).write_bytes(&sound.format);
    if fmt_len & 1 == 1 {
        w.write_u8(0);
    }
    w.write_bytes(b"data").write_u32(data_len).write_bytes(&sound.data);
    if data_len & 1 == 1 {
        w.write_u8(0);
    }
    w.into_inner()
}
