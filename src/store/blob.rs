//! Blob store implementations
//!
//! Both stores report upload progress once per [`UPLOAD_CHUNK_SIZE`] bytes.
//! [`LocalBlobStore`] writes to a `.part` sibling and renames it into place,
//! so a failed upload never leaves a truncated blob at its path.

use crate::store::error::{StoreError, StoreResult};
use crate::store::{BlobStore, ProgressFn};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

/// Bytes written between progress callbacks
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Blob paths are relative, `/`-separated and may not climb out of the root
fn check_path(path: &str) -> StoreResult<()> {
    let p = Path::new(path);
    let valid = !path.is_empty()
        && p.components().all(|c| matches!(c, Component::Normal(_)));
    if valid {
        Ok(())
    } else {
        Err(StoreError::PermissionDenied(format!("invalid blob path: {}", path)))
    }
}

/// Process-local blob store
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.blobs.read().await.contains_key(path)
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    /// Paths of all stored blobs, sorted
    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.blobs.read().await.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn url_for(path: &str) -> String {
        format!("memory://{}", path)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        path: &str,
        data: Vec<u8>,
        _content_type: &str,
        progress: ProgressFn<'_>,
    ) -> StoreResult<String> {
        check_path(path)?;

        let total = data.len() as u64;
        let mut sent = 0u64;
        for chunk in data.chunks(UPLOAD_CHUNK_SIZE) {
            sent += chunk.len() as u64;
            progress(sent, total);
        }
        if total == 0 {
            progress(0, 0);
        }

        self.blobs.write().await.insert(path.to_string(), data);
        Ok(Self::url_for(path))
    }

    async fn url(&self, path: &str) -> StoreResult<String> {
        if self.contains(path).await {
            Ok(Self::url_for(path))
        } else {
            Err(StoreError::NotFound(format!("blob {}", path)))
        }
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        self.blobs
            .write()
            .await
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("blob {}", path)))
    }
}

/// Blob store backed by files under a root directory
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        // Canonical so URLs are absolute
        let root = tokio::fs::canonicalize(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, path: &str) -> StoreResult<PathBuf> {
        check_path(path)?;
        Ok(self.root.join(path))
    }

    fn url_for(file: &Path) -> String {
        format!("file://{}", file.display())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
        progress: ProgressFn<'_>,
    ) -> StoreResult<String> {
        let file_path = self.file_path(path)?;
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let total = data.len() as u64;
        let partial = partial_path(&file_path);
        if let Err(e) = write_then_rename(&partial, &file_path, &data, progress).await {
            match tokio::fs::remove_file(&partial).await {
                Ok(()) => {}
                Err(rm) if rm.kind() == std::io::ErrorKind::NotFound => {}
                Err(rm) => {
                    tracing::warn!(path = %partial.display(), error = %rm, "Failed to remove partial blob")
                }
            }
            return Err(e);
        }

        tracing::debug!(path = %path, bytes = total, content_type = %content_type, "Stored blob");
        Ok(Self::url_for(&file_path))
    }

    async fn url(&self, path: &str) -> StoreResult<String> {
        let file_path = self.file_path(path)?;
        if tokio::fs::try_exists(&file_path).await? {
            Ok(Self::url_for(&file_path))
        } else {
            Err(StoreError::NotFound(format!("blob {}", path)))
        }
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        let file_path = self.file_path(path)?;
        match tokio::fs::remove_file(&file_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(format!("blob {}", path)))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Sibling path an upload is written to before it is renamed into place
fn partial_path(file_path: &Path) -> PathBuf {
    let mut name = file_path.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

async fn write_then_rename(
    partial: &Path,
    dest: &Path,
    data: &[u8],
    progress: ProgressFn<'_>,
) -> StoreResult<()> {
    let total = data.len() as u64;
    let mut file = tokio::fs::File::create(partial).await?;
    let mut sent = 0u64;
    for chunk in data.chunks(UPLOAD_CHUNK_SIZE) {
        file.write_all(chunk).await?;
        sent += chunk.len() as u64;
        progress(sent, total);
    }
    file.flush().await?;
    drop(file);
    if total == 0 {
        progress(0, 0);
    }

    tokio::fs::rename(partial, dest).await?;
    Ok(())
}
