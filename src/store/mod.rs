//! Document and Blob Stores
//!
//! The app persists through two kinds of external store:
//!
//! - **Document stores** ([`EntryStore`], [`RelationshipStore`],
//!   [`ProfileStore`]): keyed records, listed per user
//! - **Blob store** ([`BlobStore`]): path-addressed files with upload progress
//!
//! Implementations:
//!
//! - **memory**: [`MemoryStore`] and [`MemoryBlobStore`], process-local
//! - **file**: [`JsonFileStore`], one JSON file per collection
//! - **blob**: [`LocalBlobStore`], files under a root directory
//!
//! Writes are last-write-wins. Stores never cascade: deleting an entry
//! leaves its attachment blobs in place.

pub mod blob;
pub mod error;
pub mod file;
pub mod memory;

pub use blob::{LocalBlobStore, MemoryBlobStore, UPLOAD_CHUNK_SIZE};
pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::model::{JournalEntry, Relationship, UserProfile};
use async_trait::async_trait;

/// Progress callback: `(bytes_transferred, total_bytes)`
pub type ProgressFn<'a> = &'a (dyn Fn(u64, u64) + Send + Sync);

/// Journal entry collection
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Insert a new entry, returning its id
    async fn insert(&self, entry: JournalEntry) -> StoreResult<String>;

    async fn get(&self, id: &str) -> StoreResult<Option<JournalEntry>>;

    /// Entries of one user, newest first, at most `limit`
    async fn list(&self, user_id: &str, limit: usize) -> StoreResult<Vec<JournalEntry>>;

    /// Replace a stored entry. Fails with `NotFound` if absent.
    async fn update(&self, entry: JournalEntry) -> StoreResult<()>;

    async fn delete(&self, id: &str) -> StoreResult<()>;
}

/// Relationship collection
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    async fn insert(&self, relationship: Relationship) -> StoreResult<String>;

    async fn get(&self, id: &str) -> StoreResult<Option<Relationship>>;

    /// Relationships of one user, newest first
    async fn list(&self, user_id: &str) -> StoreResult<Vec<Relationship>>;

    async fn update(&self, relationship: Relationship) -> StoreResult<()>;

    async fn delete(&self, id: &str) -> StoreResult<()>;
}

/// User profiles, keyed by user id
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: &str) -> StoreResult<Option<UserProfile>>;

    /// Insert or replace
    async fn put(&self, profile: UserProfile) -> StoreResult<()>;
}

/// Path-addressed object store
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload bytes to `path`, reporting progress, and return the public URL
    async fn put(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
        progress: ProgressFn<'_>,
    ) -> StoreResult<String>;

    /// Public URL of an existing blob
    async fn url(&self, path: &str) -> StoreResult<String>;

    async fn delete(&self, path: &str) -> StoreResult<()>;
}
