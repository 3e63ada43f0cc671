//! References to other content items.

use super::{ContentInput, ReaderTemplate, Value};
use crate::Result;

fn read_external_reference(input: &mut ContentInput<'_>) -> Result<Value> {
    input.read_external_reference(None).map(Value::ExternalReference)
}

pub(crate) static TEMPLATES: &[ReaderTemplate] = &[ReaderTemplate::reference(
    "Microsoft.Xna.Framework.Content.ExternalReferenceReader",
    "Microsoft.Xna.Framework.Content.ExternalReference",
    read_external_reference,
)];
