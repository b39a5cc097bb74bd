use crate::{
    document::{Document, DocumentError},
    value::Value,
};
use serde::Deserialize;

///
/// DocumentWire
/// Serde decode shape used to re-check field-name uniqueness during deserialization.
///

#[derive(Deserialize)]
pub(super) struct DocumentWire {
    fields: Vec<(String, Value)>,
}

impl TryFrom<DocumentWire> for Document {
    type Error = DocumentError;

    fn try_from(wire: DocumentWire) -> Result<Self, Self::Error> {
        Self::try_from_fields(wire.fields)
    }
}
