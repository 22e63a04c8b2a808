//! Media Pipeline
//!
//! Prepares images for journal entries and moves them in and out of the
//! blob store:
//!
//! - **compress**: resize + JPEG re-encode, optional thumbnail
//! - **progress**: per-item to overall progress aggregation
//! - **pipeline**: single and batch upload, batch rollback, batch delete
//! - **error**: error types

pub mod compress;
pub mod error;
pub mod pipeline;
pub mod progress;

pub use compress::{
    compress_image, CompressOptions, CompressedImage, EncodedImage, ThumbnailOptions,
    COMPRESSED_CONTENT_TYPE,
};
pub use error::{MediaError, MediaResult};
pub use pipeline::{MediaPipeline, MediaSource, StoredBlob, UploadedImage};
pub use progress::{percent, BatchProgress};
