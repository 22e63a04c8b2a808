//! Store error types
//!
//! Errors raised by entry, relationship, profile and blob stores.

use thiserror::Error;

/// Errors that can occur in a document or blob store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Requested document or blob does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A document with the same id already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Caller is not allowed to touch this document or path
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
