//! # Moodlog
//!
//! Journaling and mood tracking core: entries with moods, tags and photos,
//! writing streaks and mood statistics, and an image upload pipeline.
//!
//! ## Modules
//!
//! - [`model`]: entries, moods, attachments, relationships, profiles
//! - [`stats`]: streaks, mood averages, tag counts, mood trend
//! - [`media`]: image compression, batch upload with rollback
//! - [`store`]: document and blob store traits and implementations
//! - [`service`]: validated operations over the stores
//! - [`app`]: wiring everything together once at startup
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use moodlog::{App, Config, Mood, NewEntry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = App::open(Config::load_default()).await?;
//!
//!     app.journal
//!         .create_entry(NewEntry::new("local", "Long walk after work").mood(Mood::GOOD).tag("outside"))
//!         .await?;
//!
//!     let stats = app.journal.stats("local").await?;
//!     println!("Current streak: {} days, trend: {}", stats.current_streak, stats.mood_trend);
//!
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod config;
pub mod media;
pub mod model;
pub mod service;
pub mod stats;
pub mod store;

pub use app::App;

pub use config::{Config, ConfigError, LoggingConfig, MediaConfig, StatsConfig, StorageConfig};

pub use model::{
    Attachment, AttachmentKind, EntryPatch, JournalEntry, Mood, NewEntry, Preferences,
    PreferencesPatch, ProfilePatch, Relationship, RelationshipPatch, RelationshipStatus,
    RelationshipType, Theme, UserProfile,
};

pub use stats::{JournalStats, MoodTrend, TagCount};

pub use media::{CompressOptions, MediaError, MediaPipeline, MediaResult, MediaSource, UploadedImage};

pub use store::{
    BlobStore, EntryStore, JsonFileStore, LocalBlobStore, MemoryBlobStore, MemoryStore,
    ProfileStore, RelationshipStore, StoreError, StoreResult,
};

pub use service::{JournalError, JournalResult, JournalService, ProfileService, RelationshipService};
