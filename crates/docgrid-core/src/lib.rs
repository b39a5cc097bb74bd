//! Core runtime for docgrid: document values, association and row keys, and
//! the association snapshot that turns a stored association document back
//! into the row view a grid persistence engine works with.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod association;
pub mod config;
pub mod document;
pub mod error;
pub mod obs;
pub mod value;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, sinks, or config loaders are re-exported here.
///

pub mod prelude {
    pub use crate::{
        association::{AssociationKey, AssociationSnapshot, AssociationStorage, RowKey, Tuple},
        document::Document,
        value::Value,
    };
}
