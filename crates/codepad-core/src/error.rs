//! Store error types

use crate::storage::DatabaseError;
use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by [`crate::ProjectStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened or migrated
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] DatabaseError),

    /// Backend failure while reading
    #[error("Read failed: {0}")]
    ReadFailed(#[source] DatabaseError),

    /// Backend failure while writing
    #[error("Write failed: {0}")]
    WriteFailed(#[source] DatabaseError),

    /// Requested record does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Input or stored payload has the wrong shape
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// A value breaks a model rule
    #[error("Invalid data: {0}")]
    Invalid(String),
}

impl StoreError {
    pub(crate) fn read(e: DatabaseError) -> Self {
        Self::ReadFailed(e)
    }

    pub(crate) fn write(e: DatabaseError) -> Self {
        Self::WriteFailed(e)
    }

    pub(crate) fn project_not_found(id: &str) -> Self {
        Self::NotFound {
            kind: "Project",
            id: id.to_string(),
        }
    }

    /// Whether this is a not-found result rather than a backend failure
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether retrying could succeed (backend failures only)
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable(_) | Self::ReadFailed(_) | Self::WriteFailed(_)
        )
    }
}
