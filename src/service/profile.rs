//! Profile Service

use crate::model::{PreferencesPatch, ProfilePatch, UserProfile};
use crate::service::error::{store_failure, JournalError, JournalResult};
use crate::store::ProfileStore;
use chrono::Utc;
use std::sync::Arc;

pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Load the user's profile, creating a default one on first use
    pub async fn get_or_create(&self, user_id: &str) -> JournalResult<UserProfile> {
        if user_id.trim().is_empty() {
            return Err(JournalError::Validation("User id is required".to_string()));
        }

        let existing = self
            .store
            .get(user_id)
            .await
            .map_err(store_failure("load profile"))?;
        if let Some(profile) = existing {
            return Ok(profile);
        }

        let profile = UserProfile::new(user_id, Utc::now());
        self.store
            .put(profile.clone())
            .await
            .map_err(store_failure("create profile"))?;
        tracing::info!(user_id = %user_id, "Created user profile");
        Ok(profile)
    }

    pub async fn update_profile(&self, user_id: &str, patch: ProfilePatch) -> JournalResult<UserProfile> {
        let mut profile = self.get_or_create(user_id).await?;
        profile.apply(patch);
        profile.validate().map_err(JournalError::Validation)?;

        self.store
            .put(profile.clone())
            .await
            .map_err(store_failure("update profile"))?;
        Ok(profile)
    }

    pub async fn update_preferences(
        &self,
        user_id: &str,
        patch: PreferencesPatch,
    ) -> JournalResult<UserProfile> {
        self.update_profile(
            user_id,
            ProfilePatch {
                preferences: Some(patch),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn complete_onboarding(&self, user_id: &str) -> JournalResult<UserProfile> {
        self.update_profile(
            user_id,
            ProfilePatch {
                onboarding_completed: Some(true),
                ..Default::default()
            },
        )
        .await
    }
}
