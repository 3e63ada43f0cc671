//! Generic readers: arrays, lists, dictionaries, nullables and enums.
//!
//! A [`GenericTemplate`] is an open reader like ``ListReader`1``. The
//! registry closes it over concrete child readers, producing a
//! [`GenericReader`] whose names are the template's with the children's
//! target types appended:
//!
//! ```text
//! Microsoft.Xna.Framework.Content.ListReader`1[[System.Int32]]
//!   -> System.Collections.Generic.List`1[[System.Int32]]
//! ```

use std::sync::Arc;

use super::{ContentInput, TypeReader, Value};
use crate::Result;

/// Decode routine of a generic reader, given its bound children.
pub type GenericReadFn = fn(&[Arc<dyn TypeReader>], &mut ContentInput<'_>) -> Result<Value>;

/// How the target type of an instantiation is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericTarget {
    /// An open generic type; arguments are appended in brackets.
    Named(&'static str),
    /// `T[]` for child `T`.
    ArrayOf,
    /// The single child's own target type (enums read as themselves).
    Underlying,
}

/// Compiled-in description of a generic reader.
#[derive(Clone, Copy)]
pub struct GenericTemplate {
    /// Open reader name, e.g. ``Microsoft.Xna.Framework.Content.ListReader`1``.
    pub reader_tag: &'static str,
    pub target: GenericTarget,
    pub arity: usize,
    pub value_type: bool,
    pub is_enum: bool,
    pub read: GenericReadFn,
}

impl std::fmt::Debug for GenericTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericTemplate")
            .field("reader_tag", &self.reader_tag)
            .field("target", &self.target)
            .field("arity", &self.arity)
            .finish()
    }
}

impl GenericTemplate {
    /// Close the template over `children`, which must number `arity`.
    pub(crate) fn instantiate(&self, children: Vec<Arc<dyn TypeReader>>) -> Arc<dyn TypeReader> {
        let args = children
            .iter()
            .map(|c| format!("[{}]", c.target_type()))
            .collect::<Vec<_>>()
            .join(",");
        let first = children.first().map(|c| c.target_type()).unwrap_or_default();
        let target_type = match self.target {
            GenericTarget::Named(name) => format!("{name}[{args}]"),
            GenericTarget::ArrayOf => format!("{first}[]"),
            GenericTarget::Underlying => first.to_owned(),
        };
        Arc::new(GenericReader {
            reader_tag: format!("{}[{args}]", self.reader_tag),
            target_type,
            value_type: self.value_type,
            is_enum: self.is_enum,
            children,
            read: self.read,
        })
    }
}

/// A generic template bound to concrete children.
pub struct GenericReader {
    reader_tag: String,
    target_type: String,
    value_type: bool,
    is_enum: bool,
    children: Vec<Arc<dyn TypeReader>>,
    read: GenericReadFn,
}

impl TypeReader for GenericReader {
    fn reader_tag(&self) -> &str {
        &self.reader_tag
    }

    fn target_type(&self) -> &str {
        &self.target_type
    }

    fn is_value_type(&self) -> bool {
        self.value_type
    }

    fn is_enum(&self) -> bool {
        self.is_enum
    }

    fn generic_args(&self) -> &[Arc<dyn TypeReader>] {
        &self.children
    }

    fn read(&self, input: &mut ContentInput<'_>) -> Result<Value> {
        (self.read)(&self.children, input)
    }
}

pub const ARRAY_READER: &str = "Microsoft.Xna.Framework.Content.ArrayReader`1";

pub(crate) const TEMPLATES: &[GenericTemplate] = &[
    GenericTemplate {
        reader_tag: ARRAY_READER,
        target: GenericTarget::ArrayOf,
        arity: 1,
        value_type: false,
        is_enum: false,
        read: read_array,
    },
    GenericTemplate {
        reader_tag: "Microsoft.Xna.Framework.Content.ListReader`1",
        target: GenericTarget::Named("System.Collections.Generic.List`1"),
        arity: 1,
        value_type: false,
        is_enum: false,
        read: read_list,
    },
    GenericTemplate {
        reader_tag: "Microsoft.Xna.Framework.Content.DictionaryReader`2",
        target: GenericTarget::Named("System.Collections.Generic.Dictionary`2"),
        arity: 2,
        value_type: false,
        is_enum: false,
        read: read_dictionary,
    },
    GenericTemplate {
        reader_tag: "Microsoft.Xna.Framework.Content.NullableReader`1",
        target: GenericTarget::Named("System.Nullable`1"),
        arity: 1,
        value_type: true,
        is_enum: false,
        read: read_nullable,
    },
    GenericTemplate {
        reader_tag: "Microsoft.Xna.Framework.Content.EnumReader`1",
        target: GenericTarget::Underlying,
        arity: 1,
        value_type: true,
        is_enum: true,
        read: read_enum,
    },
];

fn read_elements(element: &dyn TypeReader, input: &mut ContentInput<'_>) -> Result<Vec<Value>> {
    let count = input.read_varint()? as usize;
    let mut items = Vec::with_capacity(input.capacity_for(count));
    for _ in 0..count {
        items.push(input.read_value(element)?);
    }
    Ok(items)
}

fn read_array(children: &[Arc<dyn TypeReader>], input: &mut ContentInput<'_>) -> Result<Value> {
    read_elements(children[0].as_ref(), input).map(Value::Array)
}

fn read_list(children: &[Arc<dyn TypeReader>], input: &mut ContentInput<'_>) -> Result<Value> {
    read_elements(children[0].as_ref(), input).map(Value::List)
}

fn read_dictionary(children: &[Arc<dyn TypeReader>], input: &mut ContentInput<'_>) -> Result<Value> {
    let (key, value) = (children[0].as_ref(), children[1].as_ref());
    let count = input.read_varint()? as usize;
    let mut entries = Vec::with_capacity(input.capacity_for(count));
    for _ in 0..count {
        let k = input.read_value(key)?;
        let v = input.read_value(value)?;
        entries.push((k, v));
    }
    Ok(Value::Dictionary(entries))
}

fn read_nullable(children: &[Arc<dyn TypeReader>], input: &mut ContentInput<'_>) -> Result<Value> {
    if !input.read_bool()? {
        return Ok(Value::Nullable(None));
    }
    let inner = input.read_raw(children[0].as_ref())?;
    Ok(Value::Nullable(Some(Box::new(inner))))
}

fn read_enum(children: &[Arc<dyn TypeReader>], input: &mut ContentInput<'_>) -> Result<Value> {
    input.read_raw(children[0].as_ref())
}
