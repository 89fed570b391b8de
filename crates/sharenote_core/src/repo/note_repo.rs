//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist notes and their share memberships.
//! - Run content updates through `HistoryRecorder` in one transaction.
//! - Answer visibility queries (owned ∪ shared).
//!
//! # Invariants
//! - `update_note` re-reads the current content inside an `IMMEDIATE`
//!   transaction, so concurrent writers are serialized and each diff is taken
//!   against the content that writer actually replaced.
//! - Sharing is additive and idempotent; membership is never duplicated.
//! - Visibility lists are deduplicated and ordered by
//!   `updated_at DESC, uuid ASC`.

use crate::model::history::HistoryEntry;
use crate::model::note::{validate_title, Note, NoteId};
use crate::model::user::{User, UserId};
use crate::repo::history_recorder::{load_history, HistoryRecorder};
use crate::repo::user_repo::{find_user_by_username, load_shared_users, load_user};
use crate::repo::{ensure_tables, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::BTreeSet;

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    content,
    owner_uuid,
    created_at,
    updated_at
FROM notes";

/// Requested note changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteUpdate {
    /// New title; `None` keeps the current one.
    pub title: Option<String>,
    /// Full replacement content.
    pub content: String,
}

impl NoteUpdate {
    /// Content-only update.
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: content.into(),
        }
    }
}

/// Result of a committed note update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpdate {
    /// Note state after commit.
    pub note: Note,
    /// History entries appended by this update, in position order.
    pub entries: Vec<HistoryEntry>,
}

/// Result of a share request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareOutcome {
    /// Requested users that exist; empty means nothing was written.
    pub resolved: Vec<User>,
    pub owner: User,
    /// Full share membership after the request, ordered by username.
    pub shared_with: Vec<User>,
}

/// Repository interface for notes, shares and history reads.
pub trait NoteRepository {
    /// Inserts a note and returns the stored record.
    fn create_note(&self, note: &Note) -> RepoResult<Note>;
    fn get_note(&self, note_id: NoteId) -> RepoResult<Option<Note>>;
    /// Notes owned by or shared with `user`, each listed once.
    fn list_visible_notes(&self, user: UserId) -> RepoResult<Vec<Note>>;
    /// Applies content (and optional title) changes with history, atomically.
    fn update_note(
        &mut self,
        note_id: NoteId,
        update: &NoteUpdate,
        acting_user: UserId,
    ) -> RepoResult<RecordedUpdate>;
    /// Resolves usernames and adds the existing ones to the note's shares.
    fn share_note(&mut self, note_id: NoteId, usernames: &[String]) -> RepoResult<ShareOutcome>;
    /// History of one note, oldest first. No visibility filtering.
    fn list_history(&self, note_id: NoteId) -> RepoResult<Vec<HistoryEntry>>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users", "notes", "note_shares", "note_history"])?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&self, note: &Note) -> RepoResult<Note> {
        note.validate()?;
        if load_user(self.conn, note.owner)?.is_none() {
            return Err(RepoError::UserNotFound(note.owner));
        }

        self.conn.execute(
            "INSERT INTO notes (uuid, title, content, owner_uuid)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                note.id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.owner.to_string(),
            ],
        )?;

        load_note(self.conn, note.id)?.ok_or(RepoError::NoteNotFound(note.id))
    }

    fn get_note(&self, note_id: NoteId) -> RepoResult<Option<Note>> {
        load_note(self.conn, note_id)
    }

    fn list_visible_notes(&self, user: UserId) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE owner_uuid = ?1
                OR EXISTS (
                    SELECT 1
                    FROM note_shares s
                    WHERE s.note_uuid = notes.uuid
                      AND s.user_uuid = ?1
                )
             ORDER BY updated_at DESC, uuid ASC;"
        ))?;

        let mut rows = stmt.query([user.to_string()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(self.conn, row)?);
        }
        Ok(notes)
    }

    fn update_note(
        &mut self,
        note_id: NoteId,
        update: &NoteUpdate,
        acting_user: UserId,
    ) -> RepoResult<RecordedUpdate> {
        if let Some(title) = update.title.as_deref() {
            validate_title(title)?;
        }

        let note_uuid = note_id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let old_content: String = tx
            .query_row(
                "SELECT content FROM notes WHERE uuid = ?1;",
                [note_uuid.as_str()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(RepoError::NoteNotFound(note_id))?;

        if let Some(title) = update.title.as_deref() {
            tx.execute(
                "UPDATE notes SET title = ?2 WHERE uuid = ?1;",
                params![note_uuid.as_str(), title],
            )?;
        }

        let entries = HistoryRecorder::new(&tx).record_update(
            note_id,
            old_content.as_str(),
            update.content.as_str(),
            acting_user,
        )?;
        let note = load_note(&tx, note_id)?.ok_or(RepoError::NoteNotFound(note_id))?;

        tx.commit()?;
        Ok(RecordedUpdate { note, entries })
    }

    fn share_note(&mut self, note_id: NoteId, usernames: &[String]) -> RepoResult<ShareOutcome> {
        let note_uuid = note_id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let owner_uuid: String = tx
            .query_row(
                "SELECT owner_uuid FROM notes WHERE uuid = ?1;",
                [note_uuid.as_str()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(RepoError::NoteNotFound(note_id))?;
        let owner_id = parse_uuid(&owner_uuid, "notes.owner_uuid")?;

        let mut seen = BTreeSet::new();
        let mut resolved = Vec::new();
        for username in usernames {
            if !seen.insert(username.as_str()) {
                continue;
            }
            if let Some(user) = find_user_by_username(&tx, username)? {
                resolved.push(user);
            }
        }

        for user in &resolved {
            tx.execute(
                "INSERT OR IGNORE INTO note_shares (note_uuid, user_uuid) VALUES (?1, ?2);",
                params![note_uuid.as_str(), user.id.to_string()],
            )?;
        }

        let owner = load_user(&tx, owner_id)?.ok_or(RepoError::UserNotFound(owner_id))?;
        let shared_with = load_shared_users(&tx, &note_uuid)?;
        tx.commit()?;

        Ok(ShareOutcome {
            resolved,
            owner,
            shared_with,
        })
    }

    fn list_history(&self, note_id: NoteId) -> RepoResult<Vec<HistoryEntry>> {
        load_history(self.conn, note_id)
    }
}

fn load_note(conn: &Connection, note_id: NoteId) -> RepoResult<Option<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([note_id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_note_row(conn, row)?));
    }
    Ok(None)
}

fn parse_note_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let owner_text: String = row.get("owner_uuid")?;

    Ok(Note {
        id: parse_uuid(&uuid_text, "notes.uuid")?,
        title: row.get("title")?,
        content: row.get("content")?,
        owner: parse_uuid(&owner_text, "notes.owner_uuid")?,
        shared_with: load_share_ids(conn, &uuid_text)?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn load_share_ids(conn: &Connection, note_uuid: &str) -> RepoResult<Vec<UserId>> {
    let mut stmt = conn.prepare(
        "SELECT user_uuid
         FROM note_shares
         WHERE note_uuid = ?1
         ORDER BY user_uuid ASC;",
    )?;
    let mut rows = stmt.query([note_uuid])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, "note_shares.user_uuid")?);
    }
    Ok(ids)
}
