use crate::{
    association::{KeyError, SnapshotError},
    config::SchemaConfigError,
    document::DocumentError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError without origin-specific detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }

    /// Borrow the snapshot detail, if this error came from snapshot construction or access.
    #[must_use]
    pub const fn snapshot_detail(&self) -> Option<&SnapshotError> {
        match &self.detail {
            Some(ErrorDetail::Snapshot(err)) => Some(err),
            _ => None,
        }
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Snapshot(SnapshotError),

    #[error("{0}")]
    Key(KeyError),

    #[error("{0}")]
    Document(DocumentError),

    #[error("{0}")]
    Config(SchemaConfigError),
}

impl From<SnapshotError> for InternalError {
    fn from(err: SnapshotError) -> Self {
        let (class, origin) = match &err {
            SnapshotError::MalformedRowRecord { .. }
            | SnapshotError::MalformedAssociation { .. } => {
                (ErrorClass::Corruption, ErrorOrigin::Snapshot)
            }
            SnapshotError::DuplicateRowKey { .. } => (ErrorClass::Conflict, ErrorOrigin::Snapshot),
            SnapshotError::UnsupportedForEmbedded { .. } => {
                (ErrorClass::Unsupported, ErrorOrigin::Snapshot)
            }
        };

        Self {
            class,
            origin,
            message: err.to_string(),
            detail: Some(ErrorDetail::Snapshot(err)),
        }
    }
}

impl From<KeyError> for InternalError {
    fn from(err: KeyError) -> Self {
        Self {
            class: ErrorClass::InvariantViolation,
            origin: ErrorOrigin::Association,
            message: err.to_string(),
            detail: Some(ErrorDetail::Key(err)),
        }
    }
}

impl From<DocumentError> for InternalError {
    fn from(err: DocumentError) -> Self {
        let class = match &err {
            DocumentError::DuplicateField { .. } => ErrorClass::InvariantViolation,
            DocumentError::NotADocument { .. } | DocumentError::UnsupportedNumber { .. } => {
                ErrorClass::Unsupported
            }
        };

        Self {
            class,
            origin: ErrorOrigin::Document,
            message: err.to_string(),
            detail: Some(ErrorDetail::Document(err)),
        }
    }
}

impl From<SchemaConfigError> for InternalError {
    fn from(err: SchemaConfigError) -> Self {
        Self {
            class: ErrorClass::Unsupported,
            origin: ErrorOrigin::Config,
            message: err.to_string(),
            detail: Some(ErrorDetail::Config(err)),
        }
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Corruption,
    Conflict,
    Internal,
    Unsupported,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Corruption => "corruption",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Association,
    Config,
    Document,
    Snapshot,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Association => "association",
            Self::Config => "config",
            Self::Document => "document",
            Self::Snapshot => "snapshot",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
