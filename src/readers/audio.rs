//! Audio content readers.

use super::value::{Song, SoundEffect};
use super::{ContentInput, ReaderTemplate, Value};
use crate::{Error, Result};

// u32-prefixed WAVEFORMATEX, u32-prefixed samples, loop start, loop length,
// duration in milliseconds.
fn read_sound_effect(input: &mut ContentInput<'_>) -> Result<Value> {
    Ok(Value::SoundEffect(SoundEffect {
        format: input.read_blob()?,
        data: input.read_blob()?,
        loop_start: input.read_i32()?,
        loop_length: input.read_i32()?,
        duration: input.read_i32()?,
    }))
}

/// The duration is stored as a tagged object and must be an `Int32`.
fn read_song(input: &mut ContentInput<'_>) -> Result<Value> {
    let file_name = input.read_string()?;
    let duration = match input.read_object_named("System.Int32")? {
        Some(Value::Int32(ms)) => ms,
        Some(other) => {
            return Err(Error::TypeMismatch {
                expected: "System.Int32".into(),
                found: other.kind().into(),
            });
        }
        None => return Err(Error::Parse("song duration is null")),
    };
    Ok(Value::Song(Song { file_name, duration }))
}

pub(crate) static TEMPLATES: &[ReaderTemplate] = &[
    ReaderTemplate::reference(
        "Microsoft.Xna.Framework.Content.SoundEffectReader",
        "Microsoft.Xna.Framework.Audio.SoundEffect",
        read_sound_effect,
    ),
    ReaderTemplate::reference(
        "Microsoft.Xna.Framework.Content.SongReader",
        "Microsoft.Xna.Framework.Media.Song",
        read_song,
    ),
];
