//! JSON file document store
//!
//! Keeps each collection in memory and rewrites its JSON file after every
//! mutation:
//!
//! ```text
//! data_dir/
//!   entries.json
//!   relationships.json
//!   profiles.json
//! ```
//!
//! Files are written to a temporary sibling and renamed into place so a crash
//! mid-write leaves the previous version intact.

use crate::model::{JournalEntry, Relationship, UserProfile};
use crate::store::error::StoreResult;
use crate::store::memory::Tables;
use crate::store::{EntryStore, ProfileStore, RelationshipStore};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

const ENTRIES_FILE: &str = "entries.json";
const RELATIONSHIPS_FILE: &str = "relationships.json";
const PROFILES_FILE: &str = "profiles.json";

/// Document store persisted as JSON files in a directory
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    tables: RwLock<Tables>,
}

impl JsonFileStore {
    /// Open (or create) a store rooted at `dir`
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let tables = Tables {
            entries: load_collection(&dir.join(ENTRIES_FILE), |e: &JournalEntry| e.id.clone())
                .await?,
            relationships: load_collection(&dir.join(RELATIONSHIPS_FILE), |r: &Relationship| {
                r.id.clone()
            })
            .await?,
            profiles: load_collection(&dir.join(PROFILES_FILE), |p: &UserProfile| {
                p.user_id.clone()
            })
            .await?,
        };

        tracing::debug!(
            dir = %dir.display(),
            entries = tables.entries.len(),
            relationships = tables.relationships.len(),
            profiles = tables.profiles.len(),
            "Opened JSON file store"
        );

        Ok(Self {
            dir,
            tables: RwLock::new(tables),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

async fn load_collection<T, F>(path: &Path, key: F) -> StoreResult<HashMap<String, T>>
where
    T: DeserializeOwned,
    F: Fn(&T) -> String,
{
    if !tokio::fs::try_exists(path).await? {
        return Ok(HashMap::new());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let records: Vec<T> = serde_json::from_str(&content)?;
    Ok(records.into_iter().map(|r| (key(&r), r)).collect())
}

async fn save_collection<T: Serialize>(path: &Path, records: &HashMap<String, T>) -> StoreResult<()> {
    let mut sorted: Vec<(&String, &T)> = records.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let values: Vec<&T> = sorted.into_iter().map(|(_, v)| v).collect();

    let content = serde_json::to_vec_pretty(&values)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, content).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

/// Save `records`, or put `previous` back under `key` if the save fails.
///
/// A failed write leaves memory matching what is on disk.
async fn persist<T: Serialize>(
    path: &Path,
    records: &mut HashMap<String, T>,
    key: &str,
    previous: Option<T>,
) -> StoreResult<()> {
    if let Err(e) = save_collection(path, records).await {
        tracing::warn!(path = %path.display(), error = %e, "Save failed, reverting change");
        match previous {
            Some(record) => {
                records.insert(key.to_string(), record);
            }
            None => {
                records.remove(key);
            }
        }
        return Err(e);
    }
    Ok(())
}

#[async_trait]
impl EntryStore for JsonFileStore {
    async fn insert(&self, entry: JournalEntry) -> StoreResult<String> {
        let mut tables = self.tables.write().await;
        let id = tables.insert_entry(entry)?;
        persist(&self.dir.join(ENTRIES_FILE), &mut tables.entries, &id, None).await?;
        Ok(id)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<JournalEntry>> {
        Ok(self.tables.read().await.entries.get(id).cloned())
    }

    async fn list(&self, user_id: &str, limit: usize) -> StoreResult<Vec<JournalEntry>> {
        Ok(self.tables.read().await.list_entries(user_id, limit))
    }

    async fn update(&self, entry: JournalEntry) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let id = entry.id.clone();
        let previous = tables.entries.get(&id).cloned();
        tables.update_entry(entry)?;
        persist(&self.dir.join(ENTRIES_FILE), &mut tables.entries, &id, previous).await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let previous = tables.entries.get(id).cloned();
        tables.delete_entry(id)?;
        persist(&self.dir.join(ENTRIES_FILE), &mut tables.entries, id, previous).await
    }
}

#[async_trait]
impl RelationshipStore for JsonFileStore {
    async fn insert(&self, relationship: Relationship) -> StoreResult<String> {
        let mut tables = self.tables.write().await;
        let id = tables.insert_relationship(relationship)?;
        persist(&self.dir.join(RELATIONSHIPS_FILE), &mut tables.relationships, &id, None).await?;
        Ok(id)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Relationship>> {
        Ok(self.tables.read().await.relationships.get(id).cloned())
    }

    async fn list(&self, user_id: &str) -> StoreResult<Vec<Relationship>> {
        Ok(self.tables.read().await.list_relationships(user_id))
    }

    async fn update(&self, relationship: Relationship) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let id = relationship.id.clone();
        let previous = tables.relationships.get(&id).cloned();
        tables.update_relationship(relationship)?;
        persist(&self.dir.join(RELATIONSHIPS_FILE), &mut tables.relationships, &id, previous).await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let previous = tables.relationships.get(id).cloned();
        tables.delete_relationship(id)?;
        persist(&self.dir.join(RELATIONSHIPS_FILE), &mut tables.relationships, id, previous).await
    }
}

#[async_trait]
impl ProfileStore for JsonFileStore {
    async fn get(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self.tables.read().await.profiles.get(user_id).cloned())
    }

    async fn put(&self, profile: UserProfile) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let key = profile.user_id.clone();
        let previous = tables.profiles.insert(key.clone(), profile);
        persist(&self.dir.join(PROFILES_FILE), &mut tables.profiles, &key, previous).await
    }
}
