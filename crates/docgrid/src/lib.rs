//! ## Crate layout
//! - `core`: runtime document model, association keys, snapshots, and observability.
//! - `error`: stable public error taxonomy.
//!
//! The `prelude` module mirrors the surface a persistence engine needs to
//! load an association and walk its rows.

pub use docgrid_core as core;

pub mod error;

pub use error::Error;

use docgrid_core::{
    association::{AssociationKey, AssociationSnapshot},
    config::SnapshotConfig,
    document::Document,
    error::InternalError,
};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Loading
//

/// Build the snapshot of one association from its already-fetched document.
pub fn load_association(
    key: &AssociationKey,
    owner: &Document,
    config: &SnapshotConfig,
) -> Result<AssociationSnapshot, Error> {
    AssociationSnapshot::build(key, owner, config).map_err(Error::from)
}

/// [`load_association`] for a document still in `serde_json` form.
pub fn load_association_json(
    key: &AssociationKey,
    owner: serde_json::Value,
    config: &SnapshotConfig,
) -> Result<AssociationSnapshot, Error> {
    let owner = Document::try_from_json(owner).map_err(InternalError::from)?;

    load_association(key, &owner, config)
}

/// Parse and validate a snapshot configuration from TOML.
pub fn load_config(source: &str) -> Result<SnapshotConfig, Error> {
    SnapshotConfig::from_toml_str(source)
        .map_err(InternalError::from)
        .map_err(Error::from)
}

///
/// Prelude
/// Domain vocabulary plus the loader entrypoints.
///

pub mod prelude {
    pub use crate::{
        core::{
            association::{AssociationKey, AssociationSnapshot, AssociationStorage, RowKey, Tuple},
            config::{DuplicateRowPolicy, SnapshotConfig},
            document::Document,
            value::Value,
        },
        load_association, load_association_json,
    };
}
