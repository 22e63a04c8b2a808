//! Media pipeline error types

use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur while preparing or uploading media
#[derive(Error, Debug)]
pub enum MediaError {
    /// Blob exceeds the upload ceiling; rejected before any store call
    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    /// Input could not be decoded as an image
    #[error("Unsupported or corrupt image: {0}")]
    Decode(String),

    /// Re-encoding the image failed
    #[error("Image encoding failed: {0}")]
    Encode(String),

    /// Reading a local image failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Blob store rejected the upload
    #[error("Upload failed: {0}")]
    Store(#[from] StoreError),

    /// At least one item of a batch failed; completed uploads were rolled back
    #[error("Batch upload failed: {failed} of {total} items failed ({rolled_back} uploads rolled back): {first_error}")]
    BatchFailed {
        failed: usize,
        total: usize,
        rolled_back: usize,
        first_error: String,
    },
}

/// Result type alias for media operations
pub type MediaResult<T> = Result<T, MediaError>;
