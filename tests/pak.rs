use std::io::{Cursor, Read};

use pretty_assertions::assert_eq;
use xnbkit::Error;
use xnbkit::batch;
use xnbkit::compression::Builtin;
use xnbkit::cursor::ByteWriter;
use xnbkit::formats::pak::{Pak, PakReader};
use xnbkit::readers::Value;

fn pak(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.write_i32(entries.len() as i32);
    for (name, data) in entries {
        w.write_string(name).write_i32(data.len() as i32).write_bytes(data);
    }
    w.into_inner()
}

fn int32_xnb(value: i32) -> Vec<u8> {
    let mut p = ByteWriter::new();
    p.write_varint(1)
        .write_string("Microsoft.Xna.Framework.Content.Int32Reader")
        .write_i32(0)
        .write_varint(0)
        .write_varint(1)
        .write_i32(value);
    let p = p.into_inner();
    let mut w = ByteWriter::new();
    w.write_bytes(b"XNBw\x05\x00")
        .write_u32(10 + p.len() as u32)
        .write_bytes(&p);
    w.into_inner()
}

#[test]
fn entries_and_data() {
    let bytes = pak(&[("Content\\Sfx\\Click.wav", &b"RIFF...."[..]), ("empty", &b""[..])]);
    let mut reader = PakReader::new(Cursor::new(bytes)).expect("pak");

    let names: Vec<_> = reader.files().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Content\\Sfx\\Click.wav", "empty"]);

    let click = reader.get_file_by_name("content/sfx/click.wav").cloned().expect("normalized lookup");
    assert_eq!(click.size, 8);
    assert_eq!(reader.read_to_vec(&click).expect("data"), b"RIFF....".to_vec());

    let mut partial = String::new();
    reader
        .read_file(&click)
        .expect("stream")
        .take(4)
        .read_to_string(&mut partial)
        .expect("read");
    assert_eq!(partial, "RIFF");

    assert_eq!(reader["EMPTY"].size, 0);
    assert!(reader.get_file_by_name("missing").is_none());
}

#[test]
fn offset_is_relative_to_stream_start() {
    let mut bytes = vec![0xEE; 3];
    bytes.extend(pak(&[("a", &b"xyz"[..])]));
    let mut cursor = Cursor::new(bytes);
    cursor.set_position(3);
    let parsed = Pak::parse(&mut cursor).expect("pak");
    // 3 prefix + 4 count + 2 name + 4 length
    assert_eq!(parsed.entries[0].offset, 13);
}

#[test]
fn malformed_tables() {
    let mut negative_count = ByteWriter::new();
    negative_count.write_i32(-1);
    assert!(matches!(
        Pak::parse(&mut Cursor::new(negative_count.into_inner())),
        Err(Error::InvalidRange)
    ));

    let mut negative_len = ByteWriter::new();
    negative_len.write_i32(1).write_string("a").write_i32(-4);
    assert!(matches!(
        Pak::parse(&mut Cursor::new(negative_len.into_inner())),
        Err(Error::InvalidRange)
    ));

    let mut overrun = pak(&[("a", &b"abcd"[..])]);
    overrun.pop();
    assert!(matches!(
        Pak::parse(&mut Cursor::new(overrun)),
        Err(Error::InvalidRange)
    ));

    let mut short = pak(&[("a", &b"abcd"[..]), ("b", &b""[..])]);
    short.truncate(4 + 2 + 4 + 4 + 1);
    assert!(matches!(Pak::parse(&mut Cursor::new(short)), Err(Error::Io(_))));
}

#[test]
fn decode_pak_skips_raw_assets() {
    let one = int32_xnb(1);
    let two = int32_xnb(2);
    let bytes = pak(&[
        ("first.xnb", one.as_slice()),
        ("music.ogg", &b"OggS\0\0"[..]),
        ("second.xnb", two.as_slice()),
    ]);
    let mut reader = PakReader::new(Cursor::new(bytes)).expect("pak");
    let outcomes = batch::decode_pak(&mut reader, &Builtin).expect("archive readable");

    let decoded: Vec<_> = outcomes
        .iter()
        .map(|o| {
            let content = o.result.as_ref().expect("decodes");
            (o.name.as_str(), content.root.clone())
        })
        .collect();
    assert_eq!(
        decoded,
        vec![
            ("first.xnb", Some(Value::Int32(1))),
            ("second.xnb", Some(Value::Int32(2))),
        ]
    );
}
