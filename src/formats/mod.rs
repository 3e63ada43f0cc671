//! Container formats.
//!
//! | Module  | Format | Description |
//! |---------|--------|-------------|
//! | [`xnb`] | XNB    | One compiled object graph with its reader manifest |
//! | [`pak`] | Pak    | Flat named blob table bundling XNB files and raw assets |
//!
//! The two parsers differ in how they take input:
//!
//! * **XNB works on a byte slice** - the envelope declares the total size,
//!   the payload may need decompression, and decoding jumps between readers
//!   that all share one cursor. Read the file into memory first.
//! * **Pak is generic over** [`std::io::Read`] + [`std::io::Seek`] - pass a
//!   [`std::fs::File`], a [`std::io::Cursor`], or anything else that
//!   implements both. `Pak::parse` reads metadata only; [`pak::PakReader`]
//!   gives bounded access to each entry via [`std::io::Take<&mut R>`].

pub mod pak;
pub mod xnb;
