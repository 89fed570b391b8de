//! Note use-case service.
//!
//! # Responsibility
//! - Provide create/get/list/update/share/history entry points for callers.
//! - Apply the sharing policy before touching the repository.
//! - Map repository failures onto validation/forbidden/not-found errors.
//!
//! # Invariants
//! - Every call carries an explicit acting user.
//! - Content updates always go through the history-recording repository
//!   path; no update skips history.
//! - A history read by a user without read access returns an empty list
//!   rather than a forbidden error.

use crate::model::history::HistoryEntry;
use crate::model::note::{Note, NoteId, NoteValidationError};
use crate::model::user::UserId;
use crate::policy::sharing::{is_allowed, NoteAction};
use crate::repo::note_repo::{NoteRepository, NoteUpdate, RecordedUpdate, ShareOutcome};
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Coarse error category for mapping onto caller-facing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad request.
    Validation,
    Forbidden,
    NotFound,
    /// Storage or consistency failure.
    Internal,
}

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    InvalidNote(NoteValidationError),
    /// Share request named no users at all.
    EmptyShareTargets,
    /// None of the requested usernames exist.
    NoResolvableUsers(Vec<String>),
    Forbidden {
        user: UserId,
        note_id: NoteId,
        action: NoteAction,
    },
    NoteNotFound(NoteId),
    UserNotFound(UserId),
    Repo(RepoError),
}

impl NoteServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidNote(_) | Self::EmptyShareTargets | Self::NoResolvableUsers(_) => {
                ErrorKind::Validation
            }
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::NoteNotFound(_) | Self::UserNotFound(_) => ErrorKind::NotFound,
            Self::Repo(_) => ErrorKind::Internal,
        }
    }
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNote(err) => write!(f, "{err}"),
            Self::EmptyShareTargets => write!(f, "no users to share with"),
            Self::NoResolvableUsers(names) => {
                write!(f, "none of the usernames exist: {}", names.join(", "))
            }
            Self::Forbidden {
                user,
                note_id,
                action,
            } => write!(f, "user {user} may not {action} note {note_id}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidNote(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NoteNotFound(id) => Self::NoteNotFound(id),
            RepoError::UserNotFound(id) => Self::UserNotFound(id),
            RepoError::NoteValidation(err) => Self::InvalidNote(err),
            other => Self::Repo(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, NoteServiceError>;

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a note owned by `acting_user`.
    pub fn create_note(
        &self,
        acting_user: UserId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> ServiceResult<Note> {
        let note = Note::new(acting_user, title, content);
        note.validate().map_err(NoteServiceError::InvalidNote)?;
        let created = self.repo.create_note(&note)?;
        info!(
            "event=note_create module=service status=ok note_id={} user_id={acting_user}",
            created.id
        );
        Ok(created)
    }

    /// Gets one note the acting user can read.
    pub fn get_note(&self, acting_user: UserId, note_id: NoteId) -> ServiceResult<Note> {
        self.load_authorized(acting_user, note_id, NoteAction::Read)
    }

    /// Lists notes owned by or shared with the acting user.
    pub fn list_notes(&self, acting_user: UserId) -> ServiceResult<Vec<Note>> {
        Ok(self.repo.list_visible_notes(acting_user)?)
    }

    /// Replaces note content, recording the line diff as history.
    ///
    /// Owners and shared users may update.
    pub fn update_note(
        &mut self,
        acting_user: UserId,
        note_id: NoteId,
        update: NoteUpdate,
    ) -> ServiceResult<RecordedUpdate> {
        let started_at = Instant::now();
        self.load_authorized(acting_user, note_id, NoteAction::Write)?;

        match self.repo.update_note(note_id, &update, acting_user) {
            Ok(recorded) => {
                info!(
                    "event=note_update module=service status=ok note_id={note_id} user_id={acting_user} changes={} duration_ms={}",
                    recorded.entries.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(recorded)
            }
            Err(err) => {
                warn!(
                    "event=note_update module=service status=error note_id={note_id} user_id={acting_user} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err.into())
            }
        }
    }

    /// Shares a note with existing users named in `usernames`.
    ///
    /// Unknown usernames are dropped. Fails when the list is empty or when no
    /// name resolves.
    pub fn share_note(
        &mut self,
        acting_user: UserId,
        note_id: NoteId,
        usernames: &[String],
    ) -> ServiceResult<ShareOutcome> {
        self.load_authorized(acting_user, note_id, NoteAction::Share)?;
        if usernames.is_empty() {
            return Err(NoteServiceError::EmptyShareTargets);
        }

        let outcome = self.repo.share_note(note_id, usernames)?;
        if outcome.resolved.is_empty() {
            return Err(NoteServiceError::NoResolvableUsers(usernames.to_vec()));
        }

        info!(
            "event=note_share module=service status=ok note_id={note_id} requested={} resolved={} members={}",
            usernames.len(),
            outcome.resolved.len(),
            outcome.shared_with.len()
        );
        Ok(outcome)
    }

    /// Returns the note's history, oldest first, or nothing when the acting
    /// user cannot read the note.
    pub fn note_history(
        &self,
        acting_user: UserId,
        note_id: NoteId,
    ) -> ServiceResult<Vec<HistoryEntry>> {
        let note = self
            .repo
            .get_note(note_id)?
            .ok_or(NoteServiceError::NoteNotFound(note_id))?;

        if !is_allowed(acting_user, &note, NoteAction::Read) {
            info!(
                "event=note_history module=service status=filtered note_id={note_id} user_id={acting_user}"
            );
            return Ok(Vec::new());
        }

        Ok(self.repo.list_history(note_id)?)
    }

    fn load_authorized(
        &self,
        acting_user: UserId,
        note_id: NoteId,
        action: NoteAction,
    ) -> ServiceResult<Note> {
        let note = self
            .repo
            .get_note(note_id)?
            .ok_or(NoteServiceError::NoteNotFound(note_id))?;

        if !is_allowed(acting_user, &note, action) {
            warn!(
                "event=note_access module=service status=forbidden note_id={note_id} user_id={acting_user} action={action}"
            );
            return Err(NoteServiceError::Forbidden {
                user: acting_user,
                note_id,
                action,
            });
        }
        Ok(note)
    }
}
