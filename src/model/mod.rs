//! Moodlog data model
//!
//! - **entry**: journal entries, attachments and entry patches
//! - **mood**: the 1-5 mood rating and its display lookup
//! - **relationship**: people the user writes about
//! - **profile**: user profile and preferences
//!
//! Partial updates are explicit patch structs. A `None` field is left
//! untouched; optional fields use `Option<Option<T>>` so `Some(None)` clears.

pub mod entry;
pub mod mood;
pub mod profile;
pub mod relationship;

pub use entry::{Attachment, AttachmentKind, EntryPatch, JournalEntry, NewEntry, MAX_TAGS, MAX_TITLE_LEN};
pub use mood::{InvalidMood, Mood, MAX_MOOD, MIN_MOOD};
pub use profile::{Preferences, PreferencesPatch, ProfilePatch, Theme, UserProfile};
pub use relationship::{Relationship, RelationshipPatch, RelationshipStatus, RelationshipType};
