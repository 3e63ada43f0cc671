//! Type readers and the read-object protocol.
//!
//! An XNB payload is not self-describing field by field. Its manifest
//! lists, by name, the type readers the writer used; everything after the
//! manifest is only interpretable by running those readers in order. This
//! module defines:
//!
//! * [`TypeReader`] - the one interface every reader implements. Whether a
//!   reader is value-typed (read inline) or reference-typed (read behind a
//!   type id) is a flag on the reader, not a different trait.
//! * [`ContentInput`] - the reading context handed to readers: a
//!   [`ByteCursor`] plus the per-file manifest, with the type-id dispatch
//!   used for every reference-typed slot.
//! * [`ReaderTemplate`] - a compiled-in description of a non-generic
//!   reader. [`generic::GenericTemplate`] is the parameterized
//!   counterpart. [`Registry`] turns manifest names into readers.
//!
//! ## Read-object protocol
//! ```text
//! varint type_id
//!   0        -> no value
//!   1..=N    -> manifest[type_id - 1].read(...)
//!   > N      -> Error::TypeIdOutOfRange
//! ```
//! Value-typed fields have no type id; the declaring reader calls the
//! field's reader directly ([`ContentInput::read_value`] picks the right
//! path from the reader's flag).

pub mod audio;
pub mod content;
pub mod enums;
pub mod generic;
pub mod graphics;
pub mod math;
pub mod primitive;
pub mod registry;
pub mod value;

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::cursor::ByteCursor;
use crate::formats::xnb::Platform;
use crate::{Error, Result};

pub use enums::EnumDef;
pub use registry::Registry;
pub use value::Value;

use value::ExternalReference;

/// Deepest allowed nesting of objects within objects.
pub const MAX_DEPTH: usize = 256;

/// Decode routine of a stateless reader.
pub type DecodeFn = fn(&mut ContentInput<'_>) -> Result<Value>;

/// A decoder for one target type.
pub trait TypeReader: Send + Sync {
    /// Name of the reader as the manifest spells it (assembly stripped).
    fn reader_tag(&self) -> &str;

    /// Name of the type this reader produces.
    fn target_type(&self) -> &str;

    /// Value-typed readers are read inline, never behind a type id.
    fn is_value_type(&self) -> bool {
        false
    }

    fn is_enum(&self) -> bool {
        false
    }

    /// Readers this one was instantiated with, for generic readers.
    fn generic_args(&self) -> &[Arc<dyn TypeReader>] {
        &[]
    }

    /// Second phase of manifest loading, run once every manifest entry has
    /// been resolved. Readers that need other readers by type look them up
    /// here. The default initializes generic arguments.
    fn init(&self, cx: &InitContext<'_>) -> Result<()> {
        for arg in self.generic_args() {
            arg.init(cx)?;
        }
        Ok(())
    }

    /// Decode one value, consuming exactly its bytes.
    fn read(&self, input: &mut ContentInput<'_>) -> Result<Value>;
}

impl fmt::Debug for dyn TypeReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeReader")
            .field("reader_tag", &self.reader_tag())
            .field("target_type", &self.target_type())
            .finish()
    }
}

/// What [`TypeReader::init`] gets to see.
#[derive(Debug, Clone, Copy)]
pub struct InitContext<'a> {
    pub registry: &'a Registry,
    pub platform: Platform,
    pub version: u8,
}

/// Reading context for one decode session.
///
/// Dereferences to the underlying [`ByteCursor`], so readers call
/// primitive reads on it directly.
pub struct ContentInput<'a> {
    cursor: ByteCursor<'a>,
    readers: &'a [Arc<dyn TypeReader>],
    platform: Platform,
    version: u8,
    depth: usize,
}

impl<'a> Deref for ContentInput<'a> {
    type Target = ByteCursor<'a>;

    fn deref(&self) -> &Self::Target {
        &self.cursor
    }
}

impl DerefMut for ContentInput<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.cursor
    }
}

impl<'a> ContentInput<'a> {
    /// `readers` is the resolved manifest; type id `n` selects
    /// `readers[n - 1]`.
    pub fn new(
        cursor: ByteCursor<'a>,
        readers: &'a [Arc<dyn TypeReader>],
        platform: Platform,
        version: u8,
    ) -> Self {
        Self {
            cursor,
            readers,
            platform,
            version,
            depth: 0,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Format version byte of the file being read.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Read a type id and return the manifest reader it names.
    pub fn read_type_id(&mut self) -> Result<Option<&'a Arc<dyn TypeReader>>> {
        let id = self.cursor.read_varint()?;
        if id == 0 {
            return Ok(None);
        }
        let readers = self.readers;
        match readers.get(id as usize - 1) {
            Some(reader) => Ok(Some(reader)),
            None => Err(Error::TypeIdOutOfRange {
                id,
                len: readers.len(),
            }),
        }
    }

    /// Read a type-id tagged object. `None` is a null reference.
    pub fn read_object(&mut self) -> Result<Option<Value>> {
        match self.read_type_id()? {
            Some(reader) => self.dispatch(reader.as_ref()).map(Some),
            None => Ok(None),
        }
    }

    /// Read a type-id tagged object whose reader must produce
    /// `expected_type`.
    pub fn read_object_named(&mut self, expected_type: &str) -> Result<Option<Value>> {
        let Some(reader) = self.read_type_id()? else {
            return Ok(None);
        };
        if reader.target_type() != expected_type {
            return Err(Error::TypeMismatch {
                expected: expected_type.to_owned(),
                found: reader.target_type().to_owned(),
            });
        }
        self.dispatch(reader.as_ref()).map(Some)
    }

    /// [`read_object_named`](Self::read_object_named) with the expected
    /// type taken from a reader resolved at init time.
    pub fn read_object_as(&mut self, expected: &dyn TypeReader) -> Result<Option<Value>> {
        self.read_object_named(expected.target_type())
    }

    /// Read a field declared with `reader`'s type: inline for value types,
    /// through a type id otherwise. A null reference becomes
    /// [`Value::Null`].
    pub fn read_value(&mut self, reader: &dyn TypeReader) -> Result<Value> {
        if reader.is_value_type() {
            self.read_raw(reader)
        } else {
            Ok(self.read_object()?.unwrap_or(Value::Null))
        }
    }

    /// Run `reader` at the current position without reading a type id.
    pub fn read_raw(&mut self, reader: &dyn TypeReader) -> Result<Value> {
        self.dispatch(reader)
    }

    /// Read a path to another content item.
    pub fn read_external_reference(&mut self, expected_type: Option<&str>) -> Result<ExternalReference> {
        Ok(ExternalReference {
            path: self.cursor.read_string()?,
            expected_type: expected_type.map(str::to_owned),
        })
    }

    /// Read a `u32`-length-prefixed byte blob.
    pub fn read_blob(&mut self) -> Result<Vec<u8>> {
        let len = self.cursor.read_u32()? as usize;
        Ok(self.cursor.read_bytes(len)?.to_vec())
    }

    /// Initial capacity for a collection of `count` items read from data.
    ///
    /// Every item takes at least one byte, so more than the remaining byte
    /// count can never be needed.
    pub fn capacity_for(&self, count: usize) -> usize {
        count.min(self.cursor.remaining())
    }

    fn dispatch(&mut self, reader: &dyn TypeReader) -> Result<Value> {
        if self.depth >= MAX_DEPTH {
            return Err(Error::Parse("object graph nested too deeply"));
        }
        log::trace!(
            "{} at offset {}",
            reader.reader_tag(),
            self.cursor.tell()
        );
        self.depth += 1;
        let value = reader.read(self);
        self.depth -= 1;
        value
    }
}

/// How a [`ReaderTemplate`] becomes a reader.
#[derive(Clone, Copy)]
pub enum Make {
    /// A stateless decode function.
    Leaf(DecodeFn),
    /// An enum member table.
    Enum(&'static EnumDef),
    /// A reader with its own state (dependencies bound at init).
    Custom(fn() -> Arc<dyn TypeReader>),
}

/// Compiled-in description of a non-generic reader.
#[derive(Clone, Copy)]
pub struct ReaderTemplate {
    pub reader_tag: &'static str,
    pub target_type: &'static str,
    pub value_type: bool,
    pub make: Make,
}

impl fmt::Debug for ReaderTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderTemplate")
            .field("reader_tag", &self.reader_tag)
            .field("target_type", &self.target_type)
            .field("value_type", &self.value_type)
            .field("enum", &self.is_enum())
            .finish()
    }
}

impl ReaderTemplate {
    pub const fn value(reader_tag: &'static str, target_type: &'static str, decode: DecodeFn) -> Self {
        Self {
            reader_tag,
            target_type,
            value_type: true,
            make: Make::Leaf(decode),
        }
    }

    pub const fn reference(reader_tag: &'static str, target_type: &'static str, decode: DecodeFn) -> Self {
        Self {
            reader_tag,
            target_type,
            value_type: false,
            make: Make::Leaf(decode),
        }
    }

    /// Enum readers have no serializer-side class of their own; they are
    /// keyed by the enum's type name in both namespaces.
    pub const fn enumeration(def: &'static EnumDef) -> Self {
        Self {
            reader_tag: def.type_name,
            target_type: def.type_name,
            value_type: true,
            make: Make::Enum(def),
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.make, Make::Enum(_))
    }

    /// Build the reader this template describes.
    pub fn instantiate(&self) -> Arc<dyn TypeReader> {
        match self.make {
            Make::Leaf(decode) => Arc::new(LeafReader {
                reader_tag: self.reader_tag,
                target_type: self.target_type,
                value_type: self.value_type,
                decode,
            }),
            Make::Enum(def) => Arc::new(enums::EnumValueReader::new(def)),
            Make::Custom(make) => make(),
        }
    }
}

/// A reader that is just a decode function.
pub struct LeafReader {
    reader_tag: &'static str,
    target_type: &'static str,
    value_type: bool,
    decode: DecodeFn,
}

impl TypeReader for LeafReader {
    fn reader_tag(&self) -> &str {
        self.reader_tag
    }

    fn target_type(&self) -> &str {
        self.target_type
    }

    fn is_value_type(&self) -> bool {
        self.value_type
    }

    fn read(&self, input: &mut ContentInput<'_>) -> Result<Value> {
        (self.decode)(input)
    }
}

/// Resolve `type_name` once and keep it, for readers that bind other
/// readers during [`TypeReader::init`].
pub(crate) fn bind(
    slot: &std::sync::OnceLock<Arc<dyn TypeReader>>,
    cx: &InitContext<'_>,
    type_name: &str,
) -> Result<()> {
    if slot.get().is_none() {
        let reader = cx.registry.resolve_by_type(type_name)?;
        // Losing a race here is fine: both sides resolved the same reader.
        let _ = slot.set(reader);
    }
    Ok(())
}

/// Fetch a reader bound by [`bind`].
pub(crate) fn bound<'r>(
    slot: &'r std::sync::OnceLock<Arc<dyn TypeReader>>,
    what: &'static str,
) -> Result<&'r dyn TypeReader> {
    slot.get()
        .map(|r| r.as_ref())
        .ok_or(Error::Parse(what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::ByteWriter;

    /// Reads a tagged object as its only field.
    struct Chain;

    impl TypeReader for Chain {
        fn reader_tag(&self) -> &str {
            "Test.ChainReader"
        }

        fn target_type(&self) -> &str {
            "Test.Chain"
        }

        fn read(&self, input: &mut ContentInput<'_>) -> Result<Value> {
            Ok(Value::List(input.read_object()?.into_iter().collect()))
        }
    }

    fn chain(links: usize) -> Vec<u8> {
        let mut w = ByteWriter::new();
        for _ in 0..links {
            w.write_varint(1);
        }
        w.write_varint(0);
        w.into_inner()
    }

    #[test]
    fn test_nesting_limit() {
        let readers: Vec<Arc<dyn TypeReader>> = vec![Arc::new(Chain)];

        let ok = chain(MAX_DEPTH);
        let mut input = ContentInput::new(ByteCursor::new(&ok), &readers, Platform::Windows, 5);
        assert!(input.read_object().expect("within limit").is_some());
        assert_eq!(input.remaining(), 0);

        let deep = chain(MAX_DEPTH + 1);
        let mut input = ContentInput::new(ByteCursor::new(&deep), &readers, Platform::Windows, 5);
        assert!(matches!(input.read_object(), Err(Error::Parse(_))));
    }

    #[test]
    fn test_read_value_paths() {
        let registry = Registry::global();
        let readers = vec![registry.resolve_by_tag("Microsoft.Xna.Framework.Content.StringReader").expect("string")];
        let int = registry.resolve_by_type("System.Int32").expect("int");

        let mut w = ByteWriter::new();
        w.write_i32(9).write_varint(1).write_string("s").write_varint(0);
        let bytes = w.into_inner();
        let mut input = ContentInput::new(ByteCursor::new(&bytes), &readers, Platform::Windows, 5);
        assert_eq!(input.read_value(int.as_ref()).expect("inline"), Value::Int32(9));
        assert_eq!(input.read_value(readers[0].as_ref()).expect("tagged"), Value::String("s".into()));
        assert_eq!(input.read_value(readers[0].as_ref()).expect("null"), Value::Null);
    }

    #[test]
    fn test_read_object_as_checks_target() {
        let registry = Registry::global();
        let readers = vec![registry.resolve_by_tag("Microsoft.Xna.Framework.Content.StringReader").expect("string")];
        let single = registry.resolve_by_type("System.Single").expect("single");
        let mut input = ContentInput::new(ByteCursor::new(&[1, 0]), &readers, Platform::Windows, 5);
        assert!(matches!(
            input.read_object_as(single.as_ref()),
            Err(Error::TypeMismatch { .. })
        ));
    }
}
