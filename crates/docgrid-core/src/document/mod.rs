//! Module: document
//! Responsibility: insertion-ordered field records as held by a document store.
//! Does not own: association shape knowledge or key reconstruction.
//!
//! Invariants:
//! - Field names within one document are unique.
//! - Field order is the order fields were first inserted (or decoded).

mod wire;


use crate::value::Value;
use candid::CandidType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;
use wire::DocumentWire;

///
/// Constants
///

/// Separator used by embedded association paths (`"addresses.home"`).
pub const PATH_SEPARATOR: char = '.';

///
/// DocumentError
///

#[derive(Debug, ThisError)]
pub enum DocumentError {
    #[error("document contains duplicate field '{field}'")]
    DuplicateField { field: String },

    #[error("expected a document, found {found}")]
    NotADocument { found: &'static str },

    #[error("number {number} cannot be represented as int, uint or float64")]
    UnsupportedNumber { number: String },
}

///
/// Document
///
/// Ordered field record. Lookups are linear; association documents and row
/// records are small enough that a side index would cost more than it saves.
///

#[derive(CandidType, Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "DocumentWire")]
pub struct Document {
    fields: Vec<(String, Value)>,
}

impl Document {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Build a document from ordered fields, rejecting repeated names.
    pub fn try_from_fields(fields: Vec<(String, Value)>) -> Result<Self, DocumentError> {
        for (i, (name, _)) in fields.iter().enumerate() {
            if fields[..i].iter().any(|(seen, _)| seen == name) {
                return Err(DocumentError::DuplicateField {
                    field: name.clone(),
                });
            }
        }

        Ok(Self { fields })
    }

    /// Insert a field, replacing (in place) any value already stored under
    /// the same name. Returns the replaced value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();

        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    /// Builder-style [`Document::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Borrow a nested document stored directly under `name`.
    #[must_use]
    pub fn get_document(&self, name: &str) -> Option<&Self> {
        self.get(name).and_then(Value::as_document)
    }

    /// Resolve a dotted path (`"a.b.c"`) through nested documents.
    ///
    /// Returns `None` if any segment is missing or an intermediate value is
    /// not a document.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split(PATH_SEPARATOR);
        let first = segments.next()?;
        let mut current = self.get(first)?;

        for segment in segments {
            current = current.as_document()?.get(segment)?;
        }

        Some(current)
    }

    #[must_use]
    pub fn contains_field(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field names in stored order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn into_fields(self) -> Vec<(String, Value)> {
        self.fields
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

impl<K, V> FromIterator<(K, V)> for Document
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Self::new();
        for (name, value) in iter {
            doc.insert(name, value);
        }
        doc
    }
}
