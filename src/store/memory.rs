//! In-memory document store
//!
//! Holds every collection in hash maps behind a tokio `RwLock`. Used by
//! tests and as the cache underneath [`JsonFileStore`](super::JsonFileStore).

use crate::model::{JournalEntry, Relationship, UserProfile};
use crate::store::error::{StoreError, StoreResult};
use crate::store::{EntryStore, ProfileStore, RelationshipStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Collections shared by the memory and file stores
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Tables {
    #[serde(default)]
    pub entries: HashMap<String, JournalEntry>,
    #[serde(default)]
    pub relationships: HashMap<String, Relationship>,
    #[serde(default)]
    pub profiles: HashMap<String, UserProfile>,
}

impl Tables {
    pub fn insert_entry(&mut self, entry: JournalEntry) -> StoreResult<String> {
        if self.entries.contains_key(&entry.id) {
            return Err(StoreError::Conflict(format!("entry {}", entry.id)));
        }
        let id = entry.id.clone();
        self.entries.insert(id.clone(), entry);
        Ok(id)
    }

    pub fn list_entries(&self, user_id: &str, limit: usize) -> Vec<JournalEntry> {
        let mut entries: Vec<JournalEntry> = self
            .entries
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        entries.truncate(limit);
        entries
    }

    pub fn update_entry(&mut self, entry: JournalEntry) -> StoreResult<()> {
        match self.entries.get_mut(&entry.id) {
            Some(existing) => {
                *existing = entry;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("entry {}", entry.id))),
        }
    }

    pub fn delete_entry(&mut self, id: &str) -> StoreResult<()> {
        self.entries
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("entry {}", id)))
    }

    pub fn insert_relationship(&mut self, relationship: Relationship) -> StoreResult<String> {
        if self.relationships.contains_key(&relationship.id) {
            return Err(StoreError::Conflict(format!("relationship {}", relationship.id)));
        }
        let id = relationship.id.clone();
        self.relationships.insert(id.clone(), relationship);
        Ok(id)
    }

    pub fn list_relationships(&self, user_id: &str) -> Vec<Relationship> {
        let mut relationships: Vec<Relationship> = self
            .relationships
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        relationships.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        relationships
    }

    pub fn update_relationship(&mut self, relationship: Relationship) -> StoreResult<()> {
        match self.relationships.get_mut(&relationship.id) {
            Some(existing) => {
                *existing = relationship;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("relationship {}", relationship.id))),
        }
    }

    pub fn delete_relationship(&mut self, id: &str) -> StoreResult<()> {
        self.relationships
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("relationship {}", id)))
    }
}

/// Process-local store for entries, relationships and profiles
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries across all users
    pub async fn entry_count(&self) -> usize {
        self.tables.read().await.entries.len()
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn insert(&self, entry: JournalEntry) -> StoreResult<String> {
        self.tables.write().await.insert_entry(entry)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<JournalEntry>> {
        Ok(self.tables.read().await.entries.get(id).cloned())
    }

    async fn list(&self, user_id: &str, limit: usize) -> StoreResult<Vec<JournalEntry>> {
        Ok(self.tables.read().await.list_entries(user_id, limit))
    }

    async fn update(&self, entry: JournalEntry) -> StoreResult<()> {
        self.tables.write().await.update_entry(entry)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.tables.write().await.delete_entry(id)
    }
}

#[async_trait]
impl RelationshipStore for MemoryStore {
    async fn insert(&self, relationship: Relationship) -> StoreResult<String> {
        self.tables.write().await.insert_relationship(relationship)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Relationship>> {
        Ok(self.tables.read().await.relationships.get(id).cloned())
    }

    async fn list(&self, user_id: &str) -> StoreResult<Vec<Relationship>> {
        Ok(self.tables.read().await.list_relationships(user_id))
    }

    async fn update(&self, relationship: Relationship) -> StoreResult<()> {
        self.tables.write().await.update_relationship(relationship)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.tables.write().await.delete_relationship(id)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self.tables.read().await.profiles.get(user_id).cloned())
    }

    async fn put(&self, profile: UserProfile) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .profiles
            .insert(profile.user_id.clone(), profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewEntry, RelationshipType};
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_list_newest_first_and_limited() {
        let store = MemoryStore::new();
        let now = Utc::now();

        for i in 0..5 {
            let entry = JournalEntry::from_new(
                NewEntry::new("u1", format!("entry {}", i)),
                now - Duration::days(i),
            );
            EntryStore::insert(&store, entry).await.unwrap();
        }
        let other = JournalEntry::from_new(NewEntry::new("u2", "not mine"), now);
        EntryStore::insert(&store, other).await.unwrap();

        let listed = EntryStore::list(&store, "u1", 3).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].content, "entry 0");
        assert_eq!(listed[2].content, "entry 2");
        assert!(listed.iter().all(|e| e.user_id == "u1"));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let store = MemoryStore::new();
        let entry = JournalEntry::from_new(NewEntry::new("u1", "body"), Utc::now());

        let err = EntryStore::update(&store, entry.clone()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let id = EntryStore::insert(&store, entry.clone()).await.unwrap();
        assert!(matches!(
            EntryStore::insert(&store, entry).await,
            Err(StoreError::Conflict(_))
        ));

        EntryStore::delete(&store, &id).await.unwrap();
        assert!(EntryStore::get(&store, &id).await.unwrap().is_none());
        assert!(EntryStore::delete(&store, &id).await.is_err());
    }

    #[tokio::test]
    async fn test_relationships_and_profiles() {
        let store = MemoryStore::new();
        let rel = Relationship::new("u1", "Jo", RelationshipType::Family, Utc::now());
        let id = RelationshipStore::insert(&store, rel).await.unwrap();

        assert_eq!(RelationshipStore::list(&store, "u1").await.unwrap().len(), 1);
        assert!(RelationshipStore::get(&store, &id).await.unwrap().is_some());

        ProfileStore::put(&store, UserProfile::new("u1", Utc::now())).await.unwrap();
        assert!(ProfileStore::get(&store, "u1").await.unwrap().is_some());
        assert!(ProfileStore::get(&store, "u2").await.unwrap().is_none());
    }
}
