//! Journal Service
//!
//! Validates entry input, enforces ownership and forwards to the entry store.
//! Statistics are computed over the newest `fetch_limit` entries.

use crate::config::StatsConfig;
use crate::media::{MediaPipeline, MediaSource};
use crate::model::{EntryPatch, JournalEntry, NewEntry};
use crate::service::error::{store_failure, JournalError, JournalResult};
use crate::stats::{mood_trend, JournalStats, MoodTrend};
use crate::store::EntryStore;
use chrono::{DateTime, Local, TimeZone, Utc};
use std::sync::Arc;

/// Entry operations for all users of one store
pub struct JournalService {
    entries: Arc<dyn EntryStore>,
    media: Arc<MediaPipeline>,
    fetch_limit: usize,
}

impl JournalService {
    pub fn new(entries: Arc<dyn EntryStore>, media: Arc<MediaPipeline>, stats: &StatsConfig) -> Self {
        Self {
            entries,
            media,
            fetch_limit: stats.fetch_limit,
        }
    }

    /// Validate and store a new entry
    pub async fn create_entry(&self, new: NewEntry) -> JournalResult<JournalEntry> {
        new.validate().map_err(JournalError::Validation)?;
        if new.user_id.trim().is_empty() {
            return Err(JournalError::Validation("User id is required".to_string()));
        }

        let entry = JournalEntry::from_new(new, Utc::now());
        self.entries
            .insert(entry.clone())
            .await
            .map_err(store_failure("create entry"))?;

        tracing::info!(
            user_id = %entry.user_id,
            entry_id = %entry.id,
            draft = entry.is_draft,
            "Created journal entry"
        );
        Ok(entry)
    }

    /// Fetch an entry. Entries of other users are reported as absent.
    pub async fn get_entry(&self, user_id: &str, id: &str) -> JournalResult<Option<JournalEntry>> {
        let entry = self
            .entries
            .get(id)
            .await
            .map_err(store_failure("load entry"))?;
        Ok(entry.filter(|e| e.user_id == user_id))
    }

    async fn owned_entry(&self, user_id: &str, id: &str) -> JournalResult<JournalEntry> {
        self.get_entry(user_id, id)
            .await?
            .ok_or_else(|| JournalError::NotFound(format!("entry {}", id)))
    }

    /// Newest entries first
    pub async fn list_entries(&self, user_id: &str, limit: usize) -> JournalResult<Vec<JournalEntry>> {
        self.entries
            .list(user_id, limit)
            .await
            .map_err(store_failure("list entries"))
    }

    /// Merge a patch into an entry and store it
    pub async fn update_entry(
        &self,
        user_id: &str,
        id: &str,
        patch: EntryPatch,
    ) -> JournalResult<JournalEntry> {
        let mut entry = self.owned_entry(user_id, id).await?;
        if patch.is_empty() {
            return Ok(entry);
        }

        entry.apply(patch, Utc::now());
        entry.validate().map_err(JournalError::Validation)?;

        self.entries
            .update(entry.clone())
            .await
            .map_err(store_failure("update entry"))?;

        tracing::debug!(user_id = %user_id, entry_id = %id, "Updated journal entry");
        Ok(entry)
    }

    /// Delete an entry, optionally removing its attachment blobs as well.
    ///
    /// Blob removal is best effort; failures are only logged.
    pub async fn delete_entry(&self, user_id: &str, id: &str, cascade_media: bool) -> JournalResult<()> {
        let entry = self.owned_entry(user_id, id).await?;

        self.entries
            .delete(id)
            .await
            .map_err(store_failure("delete entry"))?;

        if cascade_media && !entry.attachments.is_empty() {
            let paths: Vec<String> = entry
                .attachments
                .iter()
                .flat_map(|a| a.storage_paths())
                .collect();
            let deleted = self.media.delete_batch(&paths).await;
            tracing::debug!(entry_id = %id, deleted, total = paths.len(), "Deleted attachment blobs");
        }

        tracing::info!(user_id = %user_id, entry_id = %id, "Deleted journal entry");
        Ok(())
    }

    async fn recent(&self, user_id: &str) -> JournalResult<Vec<JournalEntry>> {
        self.list_entries(user_id, self.fetch_limit).await
    }

    /// Entries created in `[from, to)`, newest first
    pub async fn entries_in_range(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> JournalResult<Vec<JournalEntry>> {
        if from >= to {
            return Err(JournalError::Validation(
                "Range start must be before range end".to_string(),
            ));
        }
        let mut entries = self.recent(user_id).await?;
        entries.retain(|e| e.created_at >= from && e.created_at < to);
        Ok(entries)
    }

    pub async fn entries_with_tag(&self, user_id: &str, tag: &str) -> JournalResult<Vec<JournalEntry>> {
        let mut entries = self.recent(user_id).await?;
        entries.retain(|e| e.has_tag(tag));
        Ok(entries)
    }

    /// Case-insensitive search over titles and content
    pub async fn search_entries(&self, user_id: &str, text: &str) -> JournalResult<Vec<JournalEntry>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(JournalError::Validation("Search text cannot be empty".to_string()));
        }
        let mut entries = self.recent(user_id).await?;
        entries.retain(|e| e.matches_text(text));
        Ok(entries)
    }

    pub async fn drafts(&self, user_id: &str) -> JournalResult<Vec<JournalEntry>> {
        let mut entries = self.recent(user_id).await?;
        entries.retain(|e| e.is_draft);
        Ok(entries)
    }

    /// Statistics in the device's local time zone
    pub async fn stats(&self, user_id: &str) -> JournalResult<JournalStats> {
        self.stats_in(user_id, &Local).await
    }

    pub async fn stats_in<Tz: TimeZone>(&self, user_id: &str, tz: &Tz) -> JournalResult<JournalStats> {
        let entries = self.recent(user_id).await?;
        Ok(JournalStats::compute_in(&entries, tz))
    }

    pub async fn mood_trend(&self, user_id: &str) -> JournalResult<MoodTrend> {
        let entries = self.recent(user_id).await?;
        Ok(mood_trend(&entries))
    }

    /// Upload images and append them to an entry as attachments.
    ///
    /// If the entry cannot be saved afterwards, the new blobs are deleted.
    pub async fn attach_images<F>(
        &self,
        user_id: &str,
        entry_id: &str,
        sources: &[MediaSource],
        on_progress: F,
    ) -> JournalResult<JournalEntry>
    where
        F: Fn(f64) + Send + Sync,
    {
        let mut entry = self.owned_entry(user_id, entry_id).await?;

        let uploaded = self.media.upload_batch(user_id, sources, on_progress).await?;
        let paths: Vec<String> = uploaded.iter().flat_map(|u| u.storage_paths()).collect();

        let mut attachments = entry.attachments.clone();
        attachments.extend(uploaded.into_iter().map(|u| u.into_attachment(None)));
        entry.apply(
            EntryPatch {
                attachments: Some(attachments),
                ..Default::default()
            },
            Utc::now(),
        );

        if let Err(e) = self.entries.update(entry.clone()).await {
            self.media.delete_batch(&paths).await;
            return Err(store_failure("attach images")(e));
        }

        tracing::info!(
            user_id = %user_id,
            entry_id = %entry_id,
            added = sources.len(),
            "Attached images to entry"
        );
        Ok(entry)
    }

    /// Remove one attachment from an entry and delete its blobs (best effort)
    pub async fn remove_attachment(
        &self,
        user_id: &str,
        entry_id: &str,
        attachment_id: &str,
    ) -> JournalResult<JournalEntry> {
        let mut entry = self.owned_entry(user_id, entry_id).await?;

        let position = entry
            .attachments
            .iter()
            .position(|a| a.id == attachment_id)
            .ok_or_else(|| JournalError::NotFound(format!("attachment {}", attachment_id)))?;

        let mut attachments = entry.attachments.clone();
        let removed = attachments.remove(position);
        entry.apply(
            EntryPatch {
                attachments: Some(attachments),
                ..Default::default()
            },
            Utc::now(),
        );

        self.entries
            .update(entry.clone())
            .await
            .map_err(store_failure("remove attachment"))?;
        self.media.delete_batch(&removed.storage_paths()).await;

        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaConfig;
    use crate::media::compress::tests::png;
    use crate::model::Mood;
    use crate::store::{MemoryBlobStore, MemoryStore, StoreError, StoreResult};
    use async_trait::async_trait;
    use chrono::Duration;

    struct Fixture {
        service: JournalService,
        blobs: Arc<MemoryBlobStore>,
    }

    fn fixture_with(entries: Arc<dyn EntryStore>) -> Fixture {
        let blobs = Arc::new(MemoryBlobStore::new());
        let media = Arc::new(MediaPipeline::new(blobs.clone(), MediaConfig::default()));
        Fixture {
            service: JournalService::new(entries, media, &StatsConfig::default()),
            blobs,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(MemoryStore::new()))
    }

    /// Entry store whose backend is always down
    struct OfflineStore;

    #[async_trait]
    impl EntryStore for OfflineStore {
        async fn insert(&self, _entry: JournalEntry) -> StoreResult<String> {
            Err(StoreError::Unavailable("offline".to_string()))
        }
        async fn get(&self, _id: &str) -> StoreResult<Option<JournalEntry>> {
            Err(StoreError::Unavailable("offline".to_string()))
        }
        async fn list(&self, _user_id: &str, _limit: usize) -> StoreResult<Vec<JournalEntry>> {
            Err(StoreError::PermissionDenied("token expired".to_string()))
        }
        async fn update(&self, _entry: JournalEntry) -> StoreResult<()> {
            Err(StoreError::Unavailable("offline".to_string()))
        }
        async fn delete(&self, _id: &str) -> StoreResult<()> {
            Err(StoreError::Unavailable("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let f = fixture();
        let entry = f
            .service
            .create_entry(NewEntry::new("u1", "Good run this morning").mood(Mood::GOOD).tag("exercise"))
            .await
            .unwrap();

        let fetched = f.service.get_entry("u1", &entry.id).await.unwrap().unwrap();
        assert_eq!(fetched, entry);

        // Other users cannot see it
        assert!(f.service.get_entry("u2", &entry.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_content_rejected_unless_draft() {
        let f = fixture();
        let err = f.service.create_entry(NewEntry::new("u1", "  ")).await.unwrap_err();
        assert!(matches!(err, JournalError::Validation(_)));

        let draft = f.service.create_entry(NewEntry::new("u1", "").draft()).await.unwrap();
        assert!(draft.is_draft);
        assert_eq!(f.service.drafts("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_entry() {
        let f = fixture();
        let entry = f
            .service
            .create_entry(NewEntry::new("u1", "first draft").draft())
            .await
            .unwrap();

        let updated = f
            .service
            .update_entry(
                "u1",
                &entry.id,
                EntryPatch {
                    content: Some("final".to_string()),
                    is_draft: Some(false),
                    mood: Some(Some(Mood::GREAT)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.content, "final");
        assert!(!updated.is_draft);
        assert_eq!(updated.created_at, entry.created_at);
        assert!(updated.updated_at >= entry.updated_at);

        // Publishing an empty draft fails validation
        let empty = f.service.create_entry(NewEntry::new("u1", "").draft()).await.unwrap();
        let err = f
            .service
            .update_entry(
                "u1",
                &empty.id,
                EntryPatch {
                    is_draft: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, JournalError::Validation(_)));

        let err = f
            .service
            .update_entry("u2", &entry.id, EntryPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, JournalError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_queries() {
        let f = fixture();
        f.service
            .create_entry(NewEntry::new("u1", "Dinner with Alex").tag("friends"))
            .await
            .unwrap();
        f.service
            .create_entry(NewEntry::new("u1", "Quiet day").title("Alone time").tag("rest"))
            .await
            .unwrap();

        assert_eq!(f.service.entries_with_tag("u1", "friends").await.unwrap().len(), 1);
        assert_eq!(f.service.search_entries("u1", "alone").await.unwrap().len(), 1);
        assert!(f.service.search_entries("u1", " ").await.is_err());

        let now = Utc::now();
        let all = f
            .service
            .entries_in_range("u1", now - Duration::hours(1), now + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert!(f.service.entries_in_range("u1", now, now).await.is_err());
    }

    #[tokio::test]
    async fn test_stats() {
        let f = fixture();
        for mood in [2, 3, 4] {
            f.service
                .create_entry(NewEntry::new("u1", "entry").mood(Mood::new(mood).unwrap()))
                .await
                .unwrap();
        }

        let stats = f.service.stats_in("u1", &Utc).await.unwrap();
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.current_streak, 1);
        assert!((stats.mood_average - 3.0).abs() < 1e-9);

        let empty = f.service.stats("nobody").await.unwrap();
        assert_eq!(empty, JournalStats::compute_in(&[], &Utc));
    }

    #[tokio::test]
    async fn test_store_failures_are_normalized() {
        let f = fixture_with(Arc::new(OfflineStore));

        let err = f.service.create_entry(NewEntry::new("u1", "hello")).await.unwrap_err();
        assert!(matches!(err, JournalError::OperationFailed("create entry")));

        let err = f.service.stats("u1").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to list entries");
    }

    #[tokio::test]
    async fn test_attach_and_cascade_delete() {
        let f = fixture();
        let entry = f.service.create_entry(NewEntry::new("u1", "Beach day")).await.unwrap();

        let sources = vec![
            MediaSource::Bytes(png(300, 200)),
            MediaSource::Bytes(png(50, 50)),
        ];
        let updated = f
            .service
            .attach_images("u1", &entry.id, &sources, |_| {})
            .await
            .unwrap();

        assert_eq!(updated.attachments.len(), 2);
        // Image + thumbnail per attachment
        assert_eq!(f.blobs.len().await, 4);

        let first = updated.attachments[0].id.clone();
        let updated = f.service.remove_attachment("u1", &entry.id, &first).await.unwrap();
        assert_eq!(updated.attachments.len(), 1);
        assert_eq!(f.blobs.len().await, 2);

        f.service.delete_entry("u1", &entry.id, true).await.unwrap();
        assert!(f.blobs.is_empty().await);
        assert!(f.service.get_entry("u1", &entry.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_attach_to_missing_entry_uploads_nothing() {
        let f = fixture();
        let err = f
            .service
            .attach_images("u1", "missing", &[MediaSource::Bytes(png(10, 10))], |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, JournalError::NotFound(_)));
        assert!(f.blobs.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_keeps_blobs_without_cascade() {
        let f = fixture();
        let entry = f.service.create_entry(NewEntry::new("u1", "Park")).await.unwrap();
        f.service
            .attach_images("u1", &entry.id, &[MediaSource::Bytes(png(10, 10))], |_| {})
            .await
            .unwrap();

        f.service.delete_entry("u1", &entry.id, false).await.unwrap();
        assert_eq!(f.blobs.len().await, 2);
    }
}
