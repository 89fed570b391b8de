//! Note edit history entries.
//!
//! # Invariants
//! - `Add` has no old text, `Delete` has no new text, `Update` has both.
//! - Entries are append-only; nothing mutates or deletes one individually.

use crate::diff::ChangeKind;
use crate::model::note::NoteId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a history entry.
pub type HistoryEntryId = Uuid;

/// One persisted line change of a note edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: HistoryEntryId,
    pub note_id: NoteId,
    /// Position within the diff alignment of the edit that produced it.
    pub line_position: u32,
    pub old_text: Option<String>,
    pub new_text: Option<String>,
    pub operation: ChangeKind,
    pub updated_by: UserId,
    /// Username of `updated_by`.
    pub updated_by_name: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl HistoryEntry {
    /// Returns whether text presence matches `operation`.
    pub fn is_well_formed(&self) -> bool {
        match self.operation {
            ChangeKind::Add => self.old_text.is_none() && self.new_text.is_some(),
            ChangeKind::Delete => self.old_text.is_some() && self.new_text.is_none(),
            ChangeKind::Update => self.old_text.is_some() && self.new_text.is_some(),
        }
    }
}
