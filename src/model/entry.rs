//! Journal entries and their attachments

use crate::model::mood::Mood;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest accepted entry title, in characters
pub const MAX_TITLE_LEN: usize = 200;
/// Most tags a single entry may carry
pub const MAX_TAGS: usize = 20;

/// A single journal entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    pub id: String,
    /// Owning user
    pub user_id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub mood: Option<Mood>,
    /// Tags in the order the user added them
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Set once at creation, never changed
    pub created_at: DateTime<Utc>,
    /// Never moves backward
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub relationship_id: Option<String>,
    #[serde(default)]
    pub is_draft: bool,
}

impl JournalEntry {
    /// Build a stored entry from user input, assigning id and timestamps
    pub fn from_new(new: NewEntry, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            title: new.title,
            content: new.content,
            mood: new.mood,
            tags: new.tags,
            attachments: new.attachments,
            created_at: now,
            updated_at: now,
            is_private: new.is_private,
            relationship_id: new.relationship_id,
            is_draft: new.is_draft,
        }
    }

    /// Merge a patch field by field.
    ///
    /// `updated_at` becomes `now` unless that would move it backward.
    pub fn apply(&mut self, patch: EntryPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(mood) = patch.mood {
            self.mood = mood;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(attachments) = patch.attachments {
            self.attachments = attachments;
        }
        if let Some(is_private) = patch.is_private {
            self.is_private = is_private;
        }
        if let Some(relationship_id) = patch.relationship_id {
            self.relationship_id = relationship_id;
        }
        if let Some(is_draft) = patch.is_draft {
            self.is_draft = is_draft;
        }
        self.updated_at = self.updated_at.max(now);
    }

    /// Check content rules. Drafts may be saved with an empty body.
    pub fn validate(&self) -> Result<(), String> {
        validate_fields(&self.title, &self.content, &self.tags, self.is_draft)
    }

    /// Case-insensitive match against title and content
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.content.to_lowercase().contains(&needle)
            || self
                .title
                .as_deref()
                .map(|t| t.to_lowercase().contains(&needle))
                .unwrap_or(false)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

fn validate_fields(
    title: &Option<String>,
    content: &str,
    tags: &[String],
    is_draft: bool,
) -> Result<(), String> {
    if !is_draft && content.trim().is_empty() {
        return Err("Entry content cannot be empty".to_string());
    }
    if let Some(title) = title {
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(format!("Title cannot exceed {} characters", MAX_TITLE_LEN));
        }
    }
    if tags.len() > MAX_TAGS {
        return Err(format!("An entry can have at most {} tags", MAX_TAGS));
    }
    if tags.iter().any(|t| t.trim().is_empty()) {
        return Err("Tags cannot be blank".to_string());
    }
    Ok(())
}

/// User input for a new entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEntry {
    pub user_id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub relationship_id: Option<String>,
    #[serde(default)]
    pub is_draft: bool,
}

impl NewEntry {
    pub fn new(user_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Builder: set title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder: set mood
    pub fn mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    /// Builder: add a tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Builder: mark as draft
    pub fn draft(mut self) -> Self {
        self.is_draft = true;
        self
    }

    /// Builder: mark as private
    pub fn private(mut self) -> Self {
        self.is_private = true;
        self
    }

    /// Builder: link to a relationship
    pub fn relationship(mut self, id: impl Into<String>) -> Self {
        self.relationship_id = Some(id.into());
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_fields(&self.title, &self.content, &self.tags, self.is_draft)
    }
}

/// Partial update for an entry.
///
/// `None` leaves a field alone. For optional fields, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub title: Option<Option<String>>,
    pub content: Option<String>,
    pub mood: Option<Option<Mood>>,
    pub tags: Option<Vec<String>>,
    pub attachments: Option<Vec<Attachment>>,
    pub is_private: Option<bool>,
    pub relationship_id: Option<Option<String>>,
    pub is_draft: Option<bool>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.mood.is_none()
            && self.tags.is_none()
            && self.attachments.is_none()
            && self.is_private.is_none()
            && self.relationship_id.is_none()
            && self.is_draft.is_none()
    }
}

/// Kind of media attached to an entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Audio,
    Video,
}

impl std::fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttachmentKind::Image => write!(f, "image"),
            AttachmentKind::Audio => write!(f, "audio"),
            AttachmentKind::Video => write!(f, "video"),
        }
    }
}

/// A media file stored in the blob store and referenced from an entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub id: String,
    pub kind: AttachmentKind,
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Blob store key, needed to delete the file
    pub storage_path: String,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Size in bytes
    #[serde(default)]
    pub size: Option<u64>,
}

impl Attachment {
    /// Every blob path owned by this attachment
    pub fn storage_paths(&self) -> Vec<String> {
        let mut paths = vec![self.storage_path.clone()];
        if let Some(thumb) = &self.thumbnail_path {
            paths.push(thumb.clone());
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_entry_validation() {
        assert!(NewEntry::new("u1", "Today was fine").validate().is_ok());
        assert!(NewEntry::new("u1", "   ").validate().is_err());
        assert!(NewEntry::new("u1", "").draft().validate().is_ok());

        let long_title = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(NewEntry::new("u1", "body").title(long_title).validate().is_err());

        let mut many_tags = NewEntry::new("u1", "body");
        many_tags.tags = (0..=MAX_TAGS).map(|i| format!("t{}", i)).collect();
        assert!(many_tags.validate().is_err());
    }

    #[test]
    fn test_apply_patch() {
        let now = Utc::now();
        let mut entry = JournalEntry::from_new(
            NewEntry::new("u1", "first").title("Title").mood(Mood::OKAY),
            now,
        );
        let created = entry.created_at;

        entry.apply(
            EntryPatch {
                content: Some("second".to_string()),
                title: Some(None),
                mood: Some(Some(Mood::GREAT)),
                ..Default::default()
            },
            now + Duration::minutes(5),
        );

        assert_eq!(entry.content, "second");
        assert_eq!(entry.title, None);
        assert_eq!(entry.mood, Some(Mood::GREAT));
        assert_eq!(entry.created_at, created);
        assert_eq!(entry.updated_at, now + Duration::minutes(5));
    }

    #[test]
    fn test_updated_at_never_moves_backward() {
        let now = Utc::now();
        let mut entry = JournalEntry::from_new(NewEntry::new("u1", "body"), now);

        entry.apply(EntryPatch::default(), now - Duration::hours(1));
        assert_eq!(entry.updated_at, now);
    }

    #[test]
    fn test_matches_text() {
        let entry = JournalEntry::from_new(
            NewEntry::new("u1", "Walked by the River").title("Sunday"),
            Utc::now(),
        );
        assert!(entry.matches_text("river"));
        assert!(entry.matches_text("SUN"));
        assert!(!entry.matches_text("mountain"));
    }

    #[test]
    fn test_entry_json_defaults() {
        let json = r#"{
            "id": "e1",
            "user_id": "u1",
            "content": "hello",
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "2024-03-01T10:00:00Z"
        }"#;
        let entry: JournalEntry = serde_json::from_str(json).unwrap();
        assert!(entry.tags.is_empty());
        assert!(entry.mood.is_none());
        assert!(!entry.is_draft);
    }
}
