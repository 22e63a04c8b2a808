//! Media upload pipeline
//!
//! ```text
//! Upload path (per item):
//!   MediaSource → read → compress (blocking pool) → size check → BlobStore::put
//!
//! Batch:
//!   all items concurrently → any failure → delete every completed upload
//! ```
//!
//! A batch is a best-effort saga, not a transaction: rollback deletions that
//! fail are logged and swallowed.

use crate::config::MediaConfig;
use crate::media::compress::{compress_image, CompressedImage, COMPRESSED_CONTENT_TYPE};
use crate::media::error::{MediaError, MediaResult};
use crate::media::progress::{percent, BatchProgress};
use crate::model::{Attachment, AttachmentKind};
use crate::store::BlobStore;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// A local image reference
#[derive(Debug, Clone)]
pub enum MediaSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl MediaSource {
    pub async fn read(&self) -> MediaResult<Vec<u8>> {
        match self {
            MediaSource::Path(path) => Ok(tokio::fs::read(path).await?),
            MediaSource::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}

impl From<PathBuf> for MediaSource {
    fn from(path: PathBuf) -> Self {
        MediaSource::Path(path)
    }
}

impl From<Vec<u8>> for MediaSource {
    fn from(bytes: Vec<u8>) -> Self {
        MediaSource::Bytes(bytes)
    }
}

/// One blob in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlob {
    pub url: String,
    /// Blob store key, needed for deletion
    pub storage_path: String,
    pub size: u64,
}

/// A compressed image and its optional thumbnail, both uploaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub image: StoredBlob,
    pub thumbnail: Option<StoredBlob>,
    pub width: u32,
    pub height: u32,
}

impl UploadedImage {
    /// Every blob path created for this image
    pub fn storage_paths(&self) -> Vec<String> {
        let mut paths = vec![self.image.storage_path.clone()];
        if let Some(thumb) = &self.thumbnail {
            paths.push(thumb.storage_path.clone());
        }
        paths
    }

    pub fn into_attachment(self, caption: Option<String>) -> Attachment {
        Attachment {
            id: Uuid::new_v4().to_string(),
            kind: AttachmentKind::Image,
            url: self.image.url,
            thumbnail_url: self.thumbnail.as_ref().map(|t| t.url.clone()),
            storage_path: self.image.storage_path,
            thumbnail_path: self.thumbnail.map(|t| t.storage_path),
            caption,
            width: Some(self.width),
            height: Some(self.height),
            size: Some(self.image.size),
        }
    }
}

/// Compresses and uploads images for one blob store
pub struct MediaPipeline {
    blobs: Arc<dyn BlobStore>,
    config: MediaConfig,
}

impl MediaPipeline {
    pub fn new(blobs: Arc<dyn BlobStore>, config: MediaConfig) -> Self {
        Self { blobs, config }
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// Storage path for a new journal image
    pub fn image_path(user_id: &str) -> String {
        format!("users/{}/journal/{}.jpg", user_id, Uuid::new_v4())
    }

    /// Storage path for a new thumbnail
    pub fn thumbnail_path(user_id: &str) -> String {
        format!("users/{}/journal/thumbnails/{}.jpg", user_id, Uuid::new_v4())
    }

    /// Compress an image off the async executor
    pub async fn compress(&self, bytes: Vec<u8>) -> MediaResult<CompressedImage> {
        let options = self.config.compress_options();
        tokio::task::spawn_blocking(move || compress_image(&bytes, &options))
            .await
            .map_err(|e| MediaError::Encode(format!("compression task failed: {}", e)))?
    }

    /// Upload one blob under the user's journal namespace.
    ///
    /// Blobs above the configured ceiling are rejected before the store is
    /// contacted. `on_progress` receives 0-100.
    pub async fn upload_single(
        &self,
        user_id: &str,
        data: Vec<u8>,
        content_type: &str,
        on_progress: &(dyn Fn(f64) + Send + Sync),
    ) -> MediaResult<StoredBlob> {
        self.put_checked(Self::image_path(user_id), data, content_type, on_progress)
            .await
    }

    async fn put_checked(
        &self,
        path: String,
        data: Vec<u8>,
        content_type: &str,
        on_progress: &(dyn Fn(f64) + Send + Sync),
    ) -> MediaResult<StoredBlob> {
        let size = data.len() as u64;
        if size > self.config.max_upload_bytes {
            return Err(MediaError::TooLarge {
                size,
                limit: self.config.max_upload_bytes,
            });
        }

        let url = self
            .blobs
            .put(&path, data, content_type, &|sent, total| {
                on_progress(percent(sent, total))
            })
            .await?;

        tracing::debug!(path = %path, bytes = size, "Uploaded blob");
        Ok(StoredBlob {
            url,
            storage_path: path,
            size,
        })
    }

    /// Compress and upload one image, plus its thumbnail when configured.
    ///
    /// Progress follows the main image. If the thumbnail upload fails, the
    /// main image is deleted again.
    pub async fn upload_image(
        &self,
        user_id: &str,
        source: &MediaSource,
        on_progress: &(dyn Fn(f64) + Send + Sync),
    ) -> MediaResult<UploadedImage> {
        let bytes = source.read().await?;
        let compressed = self.compress(bytes).await?;

        tracing::debug!(
            original = compressed.original_size,
            compressed = compressed.image.data.len(),
            ratio = compressed.ratio(),
            "Compressed image"
        );

        let width = compressed.image.width;
        let height = compressed.image.height;
        let image = self
            .put_checked(
                Self::image_path(user_id),
                compressed.image.data,
                COMPRESSED_CONTENT_TYPE,
                on_progress,
            )
            .await?;

        let thumbnail = match compressed.thumbnail {
            Some(thumb) => {
                let uploaded = self
                    .put_checked(
                        Self::thumbnail_path(user_id),
                        thumb.data,
                        COMPRESSED_CONTENT_TYPE,
                        &|_| {},
                    )
                    .await;
                match uploaded {
                    Ok(blob) => Some(blob),
                    Err(e) => {
                        self.delete_batch(std::slice::from_ref(&image.storage_path))
                            .await;
                        return Err(e);
                    }
                }
            }
            None => None,
        };

        on_progress(100.0);
        Ok(UploadedImage {
            image,
            thumbnail,
            width,
            height,
        })
    }

    /// Compress and upload every source concurrently.
    ///
    /// `on_progress` receives the mean of the item percentages after every
    /// item tick. If any item fails, all items that did upload are deleted
    /// (best effort) and the whole batch fails; no URLs are returned.
    pub async fn upload_batch<F>(
        &self,
        user_id: &str,
        sources: &[MediaSource],
        on_progress: F,
    ) -> MediaResult<Vec<UploadedImage>>
    where
        F: Fn(f64) + Send + Sync,
    {
        if sources.is_empty() {
            return Ok(Vec::new());
        }

        let progress = BatchProgress::new(sources.len(), on_progress);
        let progress = &progress;

        let uploads = sources.iter().enumerate().map(|(index, source)| async move {
            self.upload_image(user_id, source, &|p| progress.update(index, p))
                .await
        });
        let results = join_all(uploads).await;

        let total = results.len();
        let mut uploaded = Vec::with_capacity(total);
        let mut errors = Vec::new();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(image) => uploaded.push(image),
                Err(e) => {
                    tracing::error!(user_id = %user_id, item = index, error = %e, "Image upload failed");
                    errors.push(e);
                }
            }
        }

        if errors.is_empty() {
            tracing::info!(user_id = %user_id, count = total, "Uploaded image batch");
            return Ok(uploaded);
        }

        let paths: Vec<String> = uploaded.iter().flat_map(|u| u.storage_paths()).collect();
        let rolled_back = self.delete_batch(&paths).await;
        tracing::warn!(
            user_id = %user_id,
            failed = errors.len(),
            rolled_back,
            attempted = paths.len(),
            "Rolled back image batch"
        );

        Err(MediaError::BatchFailed {
            failed: errors.len(),
            total,
            rolled_back,
            first_error: errors[0].to_string(),
        })
    }

    /// Delete blobs concurrently, best effort.
    ///
    /// Failures are logged and not returned. Returns how many deletions
    /// succeeded.
    pub async fn delete_batch(&self, paths: &[String]) -> usize {
        let deletions = paths.iter().map(|path| async move {
            match self.blobs.delete(path).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Failed to delete blob");
                    false
                }
            }
        });

        join_all(deletions).await.into_iter().filter(|ok| *ok).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::compress::tests::png;
    use crate::store::{MemoryBlobStore, ProgressFn, StoreError, StoreResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn config_without_thumbnails() -> MediaConfig {
        MediaConfig {
            thumbnails: false,
            ..Default::default()
        }
    }

    /// Blob store that rejects images of one width and records every call
    #[derive(Default)]
    struct FlakyBlobStore {
        inner: MemoryBlobStore,
        reject_width: Option<u32>,
        puts: AtomicUsize,
        /// (image width, path) of every accepted upload
        stored: Mutex<Vec<(Option<u32>, String)>>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BlobStore for FlakyBlobStore {
        async fn put(
            &self,
            path: &str,
            data: Vec<u8>,
            content_type: &str,
            progress: ProgressFn<'_>,
        ) -> StoreResult<String> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            let width = image::load_from_memory(&data).map(|i| i.width()).ok();
            if width.is_some() && width == self.reject_width {
                return Err(StoreError::Unavailable("network down".to_string()));
            }
            let url = self.inner.put(path, data, content_type, progress).await?;
            self.stored.lock().unwrap().push((width, path.to_string()));
            Ok(url)
        }

        async fn url(&self, path: &str) -> StoreResult<String> {
            self.inner.url(path).await
        }

        async fn delete(&self, path: &str) -> StoreResult<()> {
            self.deleted.lock().unwrap().push(path.to_string());
            self.inner.delete(path).await
        }
    }

    #[tokio::test]
    async fn test_upload_single_rejects_oversized_before_store() {
        let store = Arc::new(FlakyBlobStore::default());
        let pipeline = MediaPipeline::new(store.clone(), MediaConfig::default());

        let blob = vec![0u8; 5 * 1024 * 1024 + 1];
        let err = pipeline
            .upload_single("u1", blob, "image/jpeg", &|_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::TooLarge { .. }));
        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upload_single_reports_progress() {
        let store = Arc::new(MemoryBlobStore::new());
        let pipeline = MediaPipeline::new(store.clone(), MediaConfig::default());
        let ticks = Mutex::new(Vec::new());

        let blob = pipeline
            .upload_single("u1", vec![1u8; 200_000], "image/jpeg", &|p| {
                ticks.lock().unwrap().push(p)
            })
            .await
            .unwrap();

        assert!(blob.storage_path.starts_with("users/u1/journal/"));
        assert_eq!(blob.size, 200_000);
        assert!(store.contains(&blob.storage_path).await);

        let ticks = ticks.into_inner().unwrap();
        assert!(ticks.len() > 1);
        assert!(ticks.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(ticks.last(), Some(&100.0));
    }

    #[tokio::test]
    async fn test_upload_image_with_thumbnail() {
        let store = Arc::new(MemoryBlobStore::new());
        let pipeline = MediaPipeline::new(store.clone(), MediaConfig::default());

        let uploaded = pipeline
            .upload_image("u1", &MediaSource::Bytes(png(1600, 800)), &|_| {})
            .await
            .unwrap();

        assert_eq!((uploaded.width, uploaded.height), (1080, 540));
        let thumb = uploaded.thumbnail.clone().unwrap();
        assert!(thumb.storage_path.contains("/thumbnails/"));
        assert_eq!(store.len().await, 2);

        let attachment = uploaded.into_attachment(Some("sunset".to_string()));
        assert_eq!(attachment.kind, AttachmentKind::Image);
        assert_eq!(attachment.storage_paths().len(), 2);
        assert_eq!(attachment.width, Some(1080));
    }

    #[tokio::test]
    async fn test_upload_batch_aggregates_progress() {
        let store = Arc::new(MemoryBlobStore::new());
        let pipeline = MediaPipeline::new(store.clone(), config_without_thumbnails());
        let reported = Mutex::new(Vec::new());

        let sources = vec![
            MediaSource::Bytes(png(20, 20)),
            MediaSource::Bytes(png(30, 30)),
        ];
        let uploaded = pipeline
            .upload_batch("u1", &sources, |p| reported.lock().unwrap().push(p))
            .await
            .unwrap();

        assert_eq!(uploaded.len(), 2);
        assert_eq!(uploaded[0].width, 20);
        assert_eq!(uploaded[1].width, 30);
        assert_eq!(store.len().await, 2);

        let reported = reported.into_inner().unwrap();
        assert!(!reported.is_empty());
        assert!(reported.iter().all(|p| (0.0..=100.0).contains(p)));
        assert_eq!(reported.last(), Some(&100.0));
    }

    #[tokio::test]
    async fn test_upload_batch_rolls_back_on_failure() {
        let store = Arc::new(FlakyBlobStore {
            reject_width: Some(16),
            ..Default::default()
        });
        let pipeline = MediaPipeline::new(store.clone(), config_without_thumbnails());

        let sources = vec![
            MediaSource::Bytes(png(8, 8)),
            MediaSource::Bytes(png(16, 16)),
            MediaSource::Bytes(png(24, 24)),
        ];
        let err = pipeline.upload_batch("u1", &sources, |_| {}).await.unwrap_err();

        match err {
            MediaError::BatchFailed {
                failed,
                total,
                rolled_back,
                ..
            } => {
                assert_eq!(failed, 1);
                assert_eq!(total, 3);
                assert_eq!(rolled_back, 2);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert_eq!(store.puts.load(Ordering::SeqCst), 3);

        // Exactly the first and third images were stored, then each deleted
        let stored = store.stored.lock().unwrap().clone();
        let mut widths: Vec<Option<u32>> = stored.iter().map(|(w, _)| *w).collect();
        widths.sort();
        assert_eq!(widths, vec![Some(8), Some(24)]);

        let mut expected: Vec<String> = stored.into_iter().map(|(_, p)| p).collect();
        expected.sort();
        let mut deleted = store.deleted.lock().unwrap().clone();
        deleted.sort();
        assert_eq!(deleted, expected);
        assert!(store.inner.is_empty().await);
    }

    #[tokio::test]
    async fn test_upload_batch_bad_source_rolls_back() {
        let store = Arc::new(MemoryBlobStore::new());
        let pipeline = MediaPipeline::new(store.clone(), MediaConfig::default());

        let sources = vec![
            MediaSource::Bytes(png(10, 10)),
            MediaSource::Bytes(b"not an image".to_vec()),
        ];
        let err = pipeline.upload_batch("u1", &sources, |_| {}).await.unwrap_err();

        assert!(matches!(err, MediaError::BatchFailed { failed: 1, .. }));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_batch_swallows_failures() {
        let store = Arc::new(MemoryBlobStore::new());
        let pipeline = MediaPipeline::new(store.clone(), MediaConfig::default());

        store
            .put("users/u1/journal/a.jpg", vec![1], "image/jpeg", &|_, _| {})
            .await
            .unwrap();

        let deleted = pipeline
            .delete_batch(&[
                "users/u1/journal/a.jpg".to_string(),
                "users/u1/journal/missing.jpg".to_string(),
            ])
            .await;

        assert_eq!(deleted, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let source = MediaSource::Path(PathBuf::from("/definitely/not/here.png"));
        assert!(matches!(source.read().await, Err(MediaError::Io(_))));
    }
}
