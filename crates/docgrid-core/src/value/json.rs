use crate::{
    document::{Document, DocumentError},
    value::Value,
};
use serde_json::{Number, Value as JsonValue};

// Map one JSON number onto the narrowest value variant that holds it exactly.
fn value_from_number(number: &Number) -> Result<Value, DocumentError> {
    if let Some(v) = number.as_i64() {
        return Ok(Value::Int(v));
    }
    if let Some(v) = number.as_u64() {
        return Ok(Value::Uint(v));
    }
    if let Some(v) = number.as_f64() {
        return Ok(Value::Float64(v.into()));
    }

    Err(DocumentError::UnsupportedNumber {
        number: number.to_string(),
    })
}

impl Value {
    /// Convert a decoded JSON value (as returned by a document-store driver
    /// in relaxed JSON mode) into a runtime value.
    ///
    /// Objects keep their field order.
    pub fn from_json(json: JsonValue) -> Result<Self, DocumentError> {
        match json {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(v) => Ok(Self::Bool(v)),
            JsonValue::Number(number) => value_from_number(&number),
            JsonValue::String(v) => Ok(Self::Text(v)),
            JsonValue::Array(items) => {
                let items = items
                    .into_iter()
                    .map(Self::from_json)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::List(items))
            }
            JsonValue::Object(map) => {
                let fields = map
                    .into_iter()
                    .map(|(name, value)| Ok((name, Self::from_json(value)?)))
                    .collect::<Result<Vec<_>, DocumentError>>()?;
                Ok(Self::Document(Document::try_from_fields(fields)?))
            }
        }
    }
}

impl Document {
    /// Convert a decoded JSON object into a document.
    pub fn try_from_json(json: JsonValue) -> Result<Self, DocumentError> {
        match Value::from_json(json)? {
            Value::Document(doc) => Ok(doc),
            other => Err(DocumentError::NotADocument {
                found: other.kind_label(),
            }),
        }
    }
}
