//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Multi-statement writes run inside one `IMMEDIATE` transaction.
//! - `history_recorder` is the only code that inserts history rows.
//! - Repository APIs return semantic errors (`NoteNotFound`, ...) in
//!   addition to DB transport errors.

pub mod history_recorder;
pub mod note_repo;
pub mod user_repo;

use crate::db::DbError;
use crate::model::note::{NoteId, NoteValidationError};
use crate::model::user::{UserId, UserValidationError};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note, user and history persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NoteValidation(NoteValidationError),
    UserValidation(UserValidationError),
    NoteNotFound(NoteId),
    UserNotFound(UserId),
    DuplicateUsername(String),
    /// Connection was not migrated to a schema containing this table.
    MissingRequiredTable(&'static str),
    /// Persisted row cannot be converted into a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NoteValidation(err) => write!(f, "{err}"),
            Self::UserValidation(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::DuplicateUsername(name) => write!(f, "username already taken: `{name}`"),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NoteValidation(err) => Some(err),
            Self::UserValidation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::NoteValidation(value)
    }
}

impl From<UserValidationError> for RepoError {
    fn from(value: UserValidationError) -> Self {
        Self::UserValidation(value)
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}
