use crate::{association::KeyError, value::Value};
use candid::CandidType;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// RowKey
///
/// Identifies one row within an association.
///
/// Equality is order-sensitive: column order carries meaning together with
/// the values, so `(a, b) = (1, 2)` and `(b, a) = (2, 1)` are different keys.
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "RowKeyWire")]
pub struct RowKey {
    table: String,
    column_names: Vec<String>,
    column_values: Vec<Value>,
}

impl RowKey {
    /// Validate and construct a row key from parallel column lists.
    pub fn new(
        table: impl Into<String>,
        column_names: Vec<String>,
        column_values: Vec<Value>,
    ) -> Result<Self, KeyError> {
        let table = table.into();

        if table.is_empty() {
            return Err(KeyError::EmptyTable);
        }
        if column_names.len() != column_values.len() {
            return Err(KeyError::ArityMismatch {
                names: column_names.len(),
                values: column_values.len(),
            });
        }

        Ok(Self::from_parts(table, column_names, column_values))
    }

    /// Construct a row key from ordered `(column, value)` pairs.
    pub fn from_columns(
        table: impl Into<String>,
        columns: impl IntoIterator<Item = (impl Into<String>, impl Into<Value>)>,
    ) -> Result<Self, KeyError> {
        let (names, values) = columns
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .unzip();

        Self::new(table, names, values)
    }

    // Reconstruction produces both lists in one loop, so arity holds by construction.
    pub(super) const fn from_parts(
        table: String,
        column_names: Vec<String>,
        column_values: Vec<Value>,
    ) -> Self {
        Self {
            table,
            column_names,
            column_values,
        }
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn column_values(&self) -> &[Value] {
        &self.column_values
    }

    /// Value stored for `column`, if the column is part of this key.
    #[must_use]
    pub fn value_of(&self, column: &str) -> Option<&Value> {
        self.column_names
            .iter()
            .position(|name| name == column)
            .map(|index| &self.column_values[index])
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.column_names.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.column_names.is_empty()
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.table)?;
        for (i, (name, value)) in self
            .column_names
            .iter()
            .zip(&self.column_values)
            .enumerate()
        {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        write!(f, ")")
    }
}

///
/// RowKeyWire
///

#[derive(Deserialize)]
struct RowKeyWire {
    table: String,
    column_names: Vec<String>,
    column_values: Vec<Value>,
}

impl TryFrom<RowKeyWire> for RowKey {
    type Error = KeyError;

    fn try_from(wire: RowKeyWire) -> Result<Self, Self::Error> {
        Self::new(wire.table, wire.column_names, wire.column_values)
    }
}
