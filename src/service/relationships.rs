//! Relationship Service

use crate::model::{Relationship, RelationshipPatch, RelationshipStatus};
use crate::service::error::{store_failure, JournalError, JournalResult};
use crate::store::RelationshipStore;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

pub struct RelationshipService {
    store: Arc<dyn RelationshipStore>,
}

impl RelationshipService {
    pub fn new(store: Arc<dyn RelationshipStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, relationship: Relationship) -> JournalResult<Relationship> {
        if relationship.user_id.trim().is_empty() {
            return Err(JournalError::Validation("User id is required".to_string()));
        }
        relationship.validate().map_err(JournalError::Validation)?;

        self.store
            .insert(relationship.clone())
            .await
            .map_err(store_failure("create relationship"))?;

        tracing::info!(
            user_id = %relationship.user_id,
            relationship_id = %relationship.id,
            kind = %relationship.kind,
            "Created relationship"
        );
        Ok(relationship)
    }

    pub async fn get(&self, user_id: &str, id: &str) -> JournalResult<Option<Relationship>> {
        let relationship = self
            .store
            .get(id)
            .await
            .map_err(store_failure("load relationship"))?;
        Ok(relationship.filter(|r| r.user_id == user_id))
    }

    async fn owned(&self, user_id: &str, id: &str) -> JournalResult<Relationship> {
        self.get(user_id, id)
            .await?
            .ok_or_else(|| JournalError::NotFound(format!("relationship {}", id)))
    }

    pub async fn list(&self, user_id: &str) -> JournalResult<Vec<Relationship>> {
        self.store
            .list(user_id)
            .await
            .map_err(store_failure("list relationships"))
    }

    pub async fn list_active(&self, user_id: &str) -> JournalResult<Vec<Relationship>> {
        let mut relationships = self.list(user_id).await?;
        relationships.retain(|r| r.status == RelationshipStatus::Active);
        Ok(relationships)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        patch: RelationshipPatch,
    ) -> JournalResult<Relationship> {
        let mut relationship = self.owned(user_id, id).await?;
        relationship.apply(patch, Utc::now());
        relationship.validate().map_err(JournalError::Validation)?;

        self.store
            .update(relationship.clone())
            .await
            .map_err(store_failure("update relationship"))?;
        Ok(relationship)
    }

    /// Mark as ended. Keeps an existing end date, otherwise uses `on`.
    pub async fn end_relationship(
        &self,
        user_id: &str,
        id: &str,
        on: NaiveDate,
    ) -> JournalResult<Relationship> {
        let current = self.owned(user_id, id).await?;
        let end_date = current.end_date.unwrap_or(on);

        self.update(
            user_id,
            id,
            RelationshipPatch {
                status: Some(RelationshipStatus::Ended),
                end_date: Some(Some(end_date)),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> JournalResult<()> {
        self.owned(user_id, id).await?;
        self.store
            .delete(id)
            .await
            .map_err(store_failure("delete relationship"))?;

        tracing::info!(user_id = %user_id, relationship_id = %id, "Deleted relationship");
        Ok(())
    }
}
