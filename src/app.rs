//! Application State
//!
//! Wires stores, the media pipeline and services together once at startup.
//! Consumers receive an `App` (or clones of its `Arc`s) instead of reaching
//! for module-level singletons.

use crate::config::Config;
use crate::media::MediaPipeline;
use crate::service::{JournalService, ProfileService, RelationshipService};
use crate::store::{
    BlobStore, EntryStore, JsonFileStore, LocalBlobStore, MemoryBlobStore, MemoryStore,
    ProfileStore, RelationshipStore, StoreResult,
};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct App {
    pub journal: Arc<JournalService>,
    pub relationships: Arc<RelationshipService>,
    pub profiles: Arc<ProfileService>,
    pub media: Arc<MediaPipeline>,
    pub config: Arc<Config>,
}

impl App {
    /// Build from explicit stores
    pub fn new<S>(documents: Arc<S>, blobs: Arc<dyn BlobStore>, config: Config) -> Self
    where
        S: EntryStore + RelationshipStore + ProfileStore + 'static,
    {
        let media = Arc::new(MediaPipeline::new(blobs, config.media.clone()));
        let entries: Arc<dyn EntryStore> = documents.clone();
        let relationships: Arc<dyn RelationshipStore> = documents.clone();
        let profiles: Arc<dyn ProfileStore> = documents;

        Self {
            journal: Arc::new(JournalService::new(entries, Arc::clone(&media), &config.stats)),
            relationships: Arc::new(RelationshipService::new(relationships)),
            profiles: Arc::new(ProfileService::new(profiles)),
            media,
            config: Arc::new(config),
        }
    }

    /// File-backed stores under `config.storage.data_dir`
    pub async fn open(config: Config) -> StoreResult<Self> {
        let documents = Arc::new(JsonFileStore::open(config.storage.documents_dir()).await?);
        let blobs = Arc::new(LocalBlobStore::open(config.storage.blobs_dir()).await?);

        tracing::debug!(
            documents = %documents.dir().display(),
            blobs = %blobs.root().display(),
            "Opened local stores"
        );
        Ok(Self::new(documents, blobs, config))
    }

    /// Process-local stores, nothing persisted
    pub fn in_memory(config: Config) -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryBlobStore::new()),
            config,
        )
    }

    /// User id the local front end acts as
    pub fn user_id(&self) -> &str {
        &self.config.user.id
    }
}
