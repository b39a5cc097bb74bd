use candid::CandidType;
use derive_more::Display;
use docgrid_core::{
    association::SnapshotError,
    error::{ErrorClass, ErrorDetail, ErrorOrigin as CoreErrorOrigin, InternalError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(CandidType, Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match &err.detail {
            Some(ErrorDetail::Snapshot(detail)) => ErrorKind::Snapshot(detail.into()),
            Some(ErrorDetail::Key(_)) => ErrorKind::Key,
            Some(ErrorDetail::Document(_)) => ErrorKind::Document,
            Some(ErrorDetail::Config(_)) => ErrorKind::Config,
            None => match err.class {
                ErrorClass::Corruption => ErrorKind::Snapshot(SnapshotErrorKind::Malformed),
                ErrorClass::Conflict => ErrorKind::Snapshot(SnapshotErrorKind::DuplicateRowKey),
                ErrorClass::Internal | ErrorClass::Unsupported | ErrorClass::InvariantViolation => {
                    ErrorKind::Internal
                }
            },
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Snapshot(SnapshotErrorKind),

    /// An association or row key failed validation.
    Key,

    /// Input could not be read as a document.
    Document,

    /// Schema configuration is invalid or unparseable.
    Config,

    /// The caller cannot remediate this.
    Internal,
}

///
/// SnapshotErrorKind
///

#[derive(CandidType, Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SnapshotErrorKind {
    /// Stored rows do not have the expected layout.
    Malformed,

    /// Two stored rows rebuilt to the same row key.
    DuplicateRowKey,

    /// The operation needs an association document, but the rows are embedded.
    UnsupportedForEmbedded,
}

impl From<&SnapshotError> for SnapshotErrorKind {
    fn from(err: &SnapshotError) -> Self {
        match err {
            SnapshotError::MalformedRowRecord { .. }
            | SnapshotError::MalformedAssociation { .. } => Self::Malformed,
            SnapshotError::DuplicateRowKey { .. } => Self::DuplicateRowKey,
            SnapshotError::UnsupportedForEmbedded { .. } => Self::UnsupportedForEmbedded,
        }
    }
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(CandidType, Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Association,
    Config,
    Document,
    Snapshot,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Association => Self::Association,
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Document => Self::Document,
            CoreErrorOrigin::Snapshot => Self::Snapshot,
        }
    }
}
