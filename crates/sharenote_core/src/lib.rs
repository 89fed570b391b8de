//! Core domain logic for sharenote: shared text notes with a line-level,
//! append-only edit history.
//!
//! Transport, authentication and response serialization live outside this
//! crate; every entry point takes the acting user explicitly.

pub mod db;
pub mod diff;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;

pub use diff::{apply_changes, compute_diff, ChangeKind, ChangeRecord};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::history::{HistoryEntry, HistoryEntryId};
pub use model::note::{Note, NoteId, NoteValidationError};
pub use model::user::{User, UserId, UserValidationError};
pub use policy::sharing::{can_read, can_share, can_write, NoteAction};
pub use repo::history_recorder::HistoryRecorder;
pub use repo::note_repo::{
    NoteRepository, NoteUpdate, RecordedUpdate, ShareOutcome, SqliteNoteRepository,
};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::note_service::{ErrorKind, NoteService, NoteServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
