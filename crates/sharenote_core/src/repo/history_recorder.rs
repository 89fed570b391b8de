//! Note edit history writer and reader.
//!
//! # Responsibility
//! - Apply a note content update and append its line diff as history rows.
//! - Read a note's history in creation order.
//!
//! # Invariants
//! - Writes only happen through a borrowed `Transaction`; the caller owns
//!   commit/rollback, so content and history land together or not at all.
//! - This is the only module that inserts into `note_history`.
//! - All rows of one update share the note's new `updated_at` timestamp.

use crate::diff::{compute_diff, ChangeKind};
use crate::model::history::HistoryEntry;
use crate::model::note::NoteId;
use crate::model::user::UserId;
use crate::repo::user_repo::load_user;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, Row, Transaction};
use uuid::Uuid;

/// Writes content updates together with their line-level history.
pub struct HistoryRecorder<'a> {
    tx: &'a Transaction<'a>,
}

impl<'a> HistoryRecorder<'a> {
    pub fn new(tx: &'a Transaction<'a>) -> Self {
        Self { tx }
    }

    /// Replaces the note content with `new_content` and appends one history
    /// entry per line change between `old_content` and `new_content`.
    ///
    /// Returns the appended entries in position order. Any error leaves the
    /// enclosing transaction to be rolled back by the caller.
    pub fn record_update(
        &self,
        note_id: NoteId,
        old_content: &str,
        new_content: &str,
        acting_user: UserId,
    ) -> RepoResult<Vec<HistoryEntry>> {
        let actor = load_user(self.tx, acting_user)?.ok_or(RepoError::UserNotFound(acting_user))?;
        let changes = compute_diff(old_content, new_content);
        let now: i64 = self.tx.query_row(
            "SELECT CAST(strftime('%s', 'now') AS INTEGER) * 1000;",
            [],
            |row| row.get(0),
        )?;

        let note_uuid = note_id.to_string();
        let changed = self.tx.execute(
            "UPDATE notes
             SET
                content = ?2,
                updated_at = ?3
             WHERE uuid = ?1;",
            params![note_uuid.as_str(), new_content, now],
        )?;
        if changed == 0 {
            return Err(RepoError::NoteNotFound(note_id));
        }

        let mut insert = self.tx.prepare(
            "INSERT INTO note_history (
                entry_uuid,
                note_uuid,
                line_position,
                old_text,
                new_text,
                operation,
                updated_by,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
        )?;

        let acting_uuid = acting_user.to_string();
        let mut entries = Vec::with_capacity(changes.len());
        for change in changes {
            let entry_id = Uuid::new_v4();
            insert.execute(params![
                entry_id.to_string(),
                note_uuid.as_str(),
                change.position,
                change.old_text.as_deref(),
                change.new_text.as_deref(),
                change.kind.as_str(),
                acting_uuid.as_str(),
                now,
            ])?;
            entries.push(HistoryEntry {
                id: entry_id,
                note_id,
                line_position: change.position,
                old_text: change.old_text,
                new_text: change.new_text,
                operation: change.kind,
                updated_by: acting_user,
                updated_by_name: actor.username.clone(),
                created_at: now,
            });
        }

        debug!(
            "event=history_record module=repo status=ok note_id={note_id} entries={}",
            entries.len()
        );
        Ok(entries)
    }
}

/// Loads every history entry of a note, oldest first.
///
/// Entries written by one update keep their insertion (position) order.
pub fn load_history(conn: &Connection, note_id: NoteId) -> RepoResult<Vec<HistoryEntry>> {
    let mut stmt = conn.prepare(
        "SELECT
            h.entry_uuid,
            h.note_uuid,
            h.line_position,
            h.old_text,
            h.new_text,
            h.operation,
            h.updated_by,
            u.username,
            h.created_at
         FROM note_history h
         INNER JOIN users u ON u.uuid = h.updated_by
         WHERE h.note_uuid = ?1
         ORDER BY h.created_at ASC, h.rowid ASC;",
    )?;

    let mut rows = stmt.query([note_id.to_string()])?;
    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        entries.push(parse_history_row(row)?);
    }
    Ok(entries)
}

fn parse_history_row(row: &Row<'_>) -> RepoResult<HistoryEntry> {
    let entry_uuid: String = row.get("entry_uuid")?;
    let note_uuid: String = row.get("note_uuid")?;
    let updated_by: String = row.get("updated_by")?;
    let username: String = row.get("username")?;

    let operation_text: String = row.get("operation")?;
    let operation = ChangeKind::parse(&operation_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid operation `{operation_text}` in note_history.operation"
        ))
    })?;

    let position: i64 = row.get("line_position")?;
    let line_position = u32::try_from(position).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid line position `{position}` in note_history.line_position"
        ))
    })?;

    let entry = HistoryEntry {
        id: parse_uuid(&entry_uuid, "note_history.entry_uuid")?,
        note_id: parse_uuid(&note_uuid, "note_history.note_uuid")?,
        line_position,
        old_text: row.get("old_text")?,
        new_text: row.get("new_text")?,
        operation,
        updated_by: parse_uuid(&updated_by, "note_history.updated_by")?,
        updated_by_name: username,
        created_at: row.get("created_at")?,
    };

    if !entry.is_well_formed() {
        return Err(RepoError::InvalidData(format!(
            "history entry {} has text fields inconsistent with `{}`",
            entry.id,
            entry.operation.as_str()
        )));
    }
    Ok(entry)
}
