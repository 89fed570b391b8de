//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its sharing membership.
//! - Validate note fields before persistence.
//!
//! # Invariants
//! - `owner` is fixed at creation.
//! - `content` is the only source of truth for the current text.
//! - `shared_with` never contains duplicates.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a note.
pub type NoteId = Uuid;

pub const NOTE_TITLE_MAX_CHARS: usize = 200;

/// Validation errors for note fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    BlankTitle,
    TitleTooLong { chars: usize, max: usize },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "note title must not be blank"),
            Self::TitleTooLong { chars, max } => {
                write!(f, "note title has {chars} characters; maximum is {max}")
            }
        }
    }
}

impl Error for NoteValidationError {}

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Current full text.
    pub content: String,
    pub owner: UserId,
    /// Users granted read/write access, ordered by id.
    pub shared_with: Vec<UserId>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

impl Note {
    /// Creates an unsaved note owned by `owner`.
    ///
    /// Timestamps are assigned by storage on insert.
    pub fn new(owner: UserId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            owner,
            shared_with: Vec::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }

    pub fn is_shared_with(&self, user: UserId) -> bool {
        self.shared_with.contains(&user)
    }

    /// Checks title constraints.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_title(&self.title)
    }
}

/// Checks one title value against note constraints.
pub fn validate_title(title: &str) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::BlankTitle);
    }
    let chars = title.chars().count();
    if chars > NOTE_TITLE_MAX_CHARS {
        return Err(NoteValidationError::TitleTooLong {
            chars,
            max: NOTE_TITLE_MAX_CHARS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_title, Note, NoteValidationError};
    use uuid::Uuid;

    #[test]
    fn new_note_starts_unshared() {
        let owner = Uuid::new_v4();
        let note = Note::new(owner, "Groceries", "milk\neggs");
        assert!(note.is_owned_by(owner));
        assert!(note.shared_with.is_empty());
        assert!(!note.is_shared_with(owner));
        assert!(note.validate().is_ok());
    }

    #[test]
    fn title_validation_rejects_blank_and_long_titles() {
        assert_eq!(validate_title(" \t"), Err(NoteValidationError::BlankTitle));
        assert!(matches!(
            validate_title(&"t".repeat(201)),
            Err(NoteValidationError::TitleTooLong { chars: 201, max: 200 })
        ));
    }
}
