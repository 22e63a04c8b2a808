//! Service error types
//!
//! Store failures are logged with their original cause and surfaced as a
//! generic `OperationFailed`, so callers only have to tell validation,
//! missing records, media problems and "try again later" apart.

use crate::media::MediaError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors returned by the journal, relationship and profile services
#[derive(Error, Debug)]
pub enum JournalError {
    /// Input rejected before any I/O
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record does not exist or belongs to another user
    #[error("Not found: {0}")]
    NotFound(String),

    /// Image compression or upload failed
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Store failure; the cause was logged
    #[error("Failed to {0}")]
    OperationFailed(&'static str),
}

/// Result type alias for service operations
pub type JournalResult<T> = Result<T, JournalError>;

/// Log a store error and normalize it
pub(crate) fn store_failure(operation: &'static str) -> impl FnOnce(StoreError) -> JournalError {
    move |err| match err {
        StoreError::NotFound(what) => JournalError::NotFound(what),
        other => {
            tracing::error!(operation, error = %other, "Store operation failed");
            JournalError::OperationFailed(operation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_normalized() {
        let err = store_failure("save entry")(StoreError::Unavailable("timeout".to_string()));
        assert_eq!(err.to_string(), "Failed to save entry");

        let err = store_failure("load entry")(StoreError::NotFound("entry e1".to_string()));
        assert!(matches!(err, JournalError::NotFound(_)));
    }

    #[test]
    fn test_media_error_conversion() {
        let err: JournalError = MediaError::TooLarge { size: 10, limit: 5 }.into();
        assert!(matches!(err, JournalError::Media(_)));
    }
}
