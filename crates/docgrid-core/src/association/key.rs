use crate::{
    association::{KeyError, ShapeKind, check_unique_columns},
    value::Value,
};
use candid::CandidType;
use serde::{Deserialize, Serialize};

///
/// AssociationStorage
///
/// Where the rows of an association are persisted.
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum AssociationStorage {
    /// Rows are a list inside the owning document, found at a dotted path.
    Embedded { path: String },

    /// Rows are the rows collection of a dedicated association document.
    Referenced,
}

impl AssociationStorage {
    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        match self {
            Self::Embedded { .. } => ShapeKind::Embedded,
            Self::Referenced => ShapeKind::Referenced,
        }
    }
}

///
/// AssociationKey
///
/// Identifies one association instance: the owning table, the columns that
/// identify the association (with their values), and the row-key columns of
/// the association's rows.
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "AssociationKeyWire")]
pub struct AssociationKey {
    table: String,
    column_names: Vec<String>,
    column_values: Vec<Value>,
    row_key_column_names: Vec<String>,
    storage: AssociationStorage,
}

impl AssociationKey {
    /// Validate and construct an association key.
    pub fn new(
        table: impl Into<String>,
        column_names: Vec<String>,
        column_values: Vec<Value>,
        row_key_column_names: Vec<String>,
        storage: AssociationStorage,
    ) -> Result<Self, KeyError> {
        let table = table.into();

        // Phase 1: validate identity and arity.
        if table.is_empty() {
            return Err(KeyError::EmptyTable);
        }
        if column_names.len() != column_values.len() {
            return Err(KeyError::ArityMismatch {
                names: column_names.len(),
                values: column_values.len(),
            });
        }
        check_unique_columns(&column_names)?;
        check_unique_columns(&row_key_column_names)?;

        // Phase 2: validate storage shape.
        if let AssociationStorage::Embedded { path } = &storage
            && path.is_empty()
        {
            return Err(KeyError::EmptyEmbeddedPath);
        }

        Ok(Self {
            table,
            column_names,
            column_values,
            row_key_column_names,
            storage,
        })
    }

    /// Construct a key for an association embedded at `path` in its owner.
    pub fn embedded(
        table: impl Into<String>,
        columns: impl IntoIterator<Item = (impl Into<String>, impl Into<Value>)>,
        row_key_column_names: impl IntoIterator<Item = impl Into<String>>,
        path: impl Into<String>,
    ) -> Result<Self, KeyError> {
        let (names, values) = split_columns(columns);

        Self::new(
            table,
            names,
            values,
            row_key_column_names.into_iter().map(Into::into).collect(),
            AssociationStorage::Embedded { path: path.into() },
        )
    }

    /// Construct a key for an association stored in its own document.
    pub fn referenced(
        table: impl Into<String>,
        columns: impl IntoIterator<Item = (impl Into<String>, impl Into<Value>)>,
        row_key_column_names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, KeyError> {
        let (names, values) = split_columns(columns);

        Self::new(
            table,
            names,
            values,
            row_key_column_names.into_iter().map(Into::into).collect(),
            AssociationStorage::Referenced,
        )
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

    #[must_use]
    pub fn row_key_column_names(&self) -> &[String] {
        &self.row_key_column_names
    }

    #[must_use]
    pub const fn storage(&self) -> &AssociationStorage {
        &self.storage
    }

    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        matches!(self.storage, AssociationStorage::Embedded { .. })
    }

    /// Value of one of the association's own columns.
    #[must_use]
    pub fn column_value(&self, column: &str) -> Option<&Value> {
        self.column_names
            .iter()
            .position(|name| name == column)
            .map(|index| &self.column_values[index])
    }
}

// Split ordered `(name, value)` pairs into the two parallel key lists.
fn split_columns(
    columns: impl IntoIterator<Item = (impl Into<String>, impl Into<Value>)>,
) -> (Vec<String>, Vec<Value>) {
    columns
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .unzip()
}

///
/// AssociationKeyWire
/// Serde decode shape used to re-run key validation during deserialization.
///

#[derive(Deserialize)]
struct AssociationKeyWire {
    table: String,
    column_names: Vec<String>,
    column_values: Vec<Value>,
    row_key_column_names: Vec<String>,
    storage: AssociationStorage,
}

impl TryFrom<AssociationKeyWire> for AssociationKey {
    type Error = KeyError;

    fn try_from(wire: AssociationKeyWire) -> Result<Self, Self::Error> {
        Self::new(
            wire.table,
            wire.column_names,
            wire.column_values,
            wire.row_key_column_names,
            wire.storage,
        )
    }
}
