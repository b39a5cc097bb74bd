//! Module: association
//! Responsibility: rebuild the row view of one association from its stored
//! document, for both the embedded and the referenced storage shape.
//! Does not own: fetching documents, write-back, or document id mapping.
//! Boundary: the only place that knows how association rows are laid out.
//!
//! Invariants:
//! - A snapshot is built in one pass and never mutated afterward.
//! - Every row key carries exactly the columns derived for its row, in order.
//! - Association-key values win over row-stored values for the same column.

mod key;
mod reconstruct;
mod row_key;
mod shape;
mod snapshot;
mod tuple;

#[cfg(test)]
mod tests;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

// re-exports
pub use key::{AssociationKey, AssociationStorage};
pub use row_key::RowKey;
pub use snapshot::AssociationSnapshot;
pub use tuple::Tuple;

///
/// ShapeKind
///
/// Physical layout an association was persisted with.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum ShapeKind {
    /// Rows live inside the owning document under a dotted path.
    #[display("embedded")]
    Embedded,

    /// Rows live in a dedicated association document, one envelope per row.
    #[display("referenced")]
    Referenced,
}

///
/// SnapshotError
///
/// Data-integrity and caller-contract failures of snapshot construction
/// and access.
///

#[derive(Debug, ThisError)]
pub enum SnapshotError {
    #[error("malformed row record at index {index}: {reason}")]
    MalformedRowRecord { index: usize, reason: String },

    #[error("malformed association: field '{field}' holds {found}, expected a list of rows")]
    MalformedAssociation { field: String, found: &'static str },

    #[error("duplicate row key reconstructed: {key}")]
    DuplicateRowKey { key: String },

    #[error("association '{table}' is embedded and has no query identifier")]
    UnsupportedForEmbedded { table: String },
}

///
/// KeyError
///
/// Construction-time validation failures of association and row keys.
///

#[derive(Debug, ThisError)]
pub enum KeyError {
    #[error("key has {names} column names but {values} column values")]
    ArityMismatch { names: usize, values: usize },

    #[error("key table name is empty")]
    EmptyTable,

    #[error("key repeats column '{column}'")]
    DuplicateColumn { column: String },

    #[error("embedded association path is empty")]
    EmptyEmbeddedPath,
}

// Reject repeated column names; position lookups would become ambiguous.
fn check_unique_columns(names: &[String]) -> Result<(), KeyError> {
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(KeyError::DuplicateColumn {
                column: name.clone(),
            });
        }
    }

    Ok(())
}
