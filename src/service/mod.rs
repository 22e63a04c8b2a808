//! Services
//!
//! The layer callers talk to. Each service is built once with its stores
//! and shared by reference; there is no global state.
//!
//! - **journal**: entries, queries, statistics, attachments
//! - **relationships**: people linked to entries
//! - **profile**: user profile and preferences
//!
//! Input is validated before any I/O. Store failures are logged and
//! returned as [`JournalError::OperationFailed`]. Nothing is retried.

pub mod error;
pub mod journal;
pub mod profile;
pub mod relationships;

pub use error::{JournalError, JournalResult};
pub use journal::JournalService;
pub use profile::ProfileService;
pub use relationships::RelationshipService;
