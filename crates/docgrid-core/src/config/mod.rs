//! Module: config
//! Responsibility: document-store schema contract and snapshot build policy.
//!
//! The field names here are shared with whatever writes association
//! documents; they are not owned by the snapshot layer.


use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Constants
///

pub const DEFAULT_ROWS_FIELD: &str = "rows";
pub const DEFAULT_COLUMNS_FIELD: &str = "columns";
pub const DEFAULT_TUPLE_FIELD: &str = "tuple";
pub const DEFAULT_ID_FIELD: &str = "_id";

///
/// SchemaConfigError
///

#[derive(Debug, ThisError)]
pub enum SchemaConfigError {
    #[error("snapshot config failed to parse: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("schema field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    #[error("schema fields '{left}' and '{right}' both resolve to '{name}'")]
    FieldCollision {
        left: &'static str,
        right: &'static str,
        name: String,
    },
}

///
/// DocumentSchema
///
/// Field names of the referenced-association layout and of the persisted
/// document identifier.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DocumentSchema {
    /// Rows collection of a referenced association document.
    pub rows_field: String,

    /// Stored key columns of one referenced row.
    pub columns_field: String,

    /// Full row payload of one referenced row.
    pub tuple_field: String,

    /// Persisted identifier of a document.
    pub id_field: String,
}

impl DocumentSchema {
    /// Reject empty names and envelope fields that would shadow each other.
    pub fn validate(&self) -> Result<(), SchemaConfigError> {
        let rows = ("rows_field", &self.rows_field);
        let columns = ("columns_field", &self.columns_field);
        let tuple = ("tuple_field", &self.tuple_field);
        let id = ("id_field", &self.id_field);

        for (field, name) in [rows, columns, tuple, id] {
            if name.is_empty() {
                return Err(SchemaConfigError::EmptyField { field });
            }
        }

        // rows and id live on the association document, columns and tuple
        // on each row envelope; only same-level names can collide
        for ((left, left_name), (right, right_name)) in [(rows, id), (columns, tuple)] {
            if left_name == right_name {
                return Err(SchemaConfigError::FieldCollision {
                    left,
                    right,
                    name: left_name.clone(),
                });
            }
        }

        Ok(())
    }
}

impl Default for DocumentSchema {
    fn default() -> Self {
        Self {
            rows_field: DEFAULT_ROWS_FIELD.to_string(),
            columns_field: DEFAULT_COLUMNS_FIELD.to_string(),
            tuple_field: DEFAULT_TUPLE_FIELD.to_string(),
            id_field: DEFAULT_ID_FIELD.to_string(),
        }
    }
}

///
/// DuplicateRowPolicy
///
/// What to do when two stored rows reconstruct to the same row key.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateRowPolicy {
    /// Abort construction with a duplicate-row-key error.
    #[default]
    #[display("reject")]
    Reject,

    /// Keep the later row at the earlier row's position.
    #[display("last_write_wins")]
    LastWriteWins,
}

///
/// SnapshotConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub schema: DocumentSchema,
    pub duplicate_rows: DuplicateRowPolicy,
}

impl SnapshotConfig {
    /// Parse and validate a TOML config.
    ///
    /// ```toml
    /// duplicate_rows = "reject"
    ///
    /// [schema]
    /// rows_field = "rows"
    /// id_field = "_id"
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, SchemaConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SchemaConfigError> {
        self.schema.validate()
    }

    #[must_use]
    pub const fn with_duplicate_rows(mut self, policy: DuplicateRowPolicy) -> Self {
        self.duplicate_rows = policy;
        self
    }
}
