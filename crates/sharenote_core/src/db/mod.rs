//! SQLite storage for users, notes, share memberships and line history.
//!
//! Schema (see `migrations/`):
//! - `users`: local mirror of externally managed identities.
//! - `notes`: current title/content per note; `owner_uuid` cannot change.
//! - `note_shares`: (note, user) membership pairs.
//! - `note_history`: append-only line changes. Rows are never updated and
//!   only disappear when their note or author is deleted.
//!
//! Connections returned from [`open_db`] and [`open_db_in_memory`] enforce
//! foreign keys and are migrated to [`migrations::latest_version`].

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// A migration script failed; the whole migration batch was rolled back.
    MigrationFailed {
        version: u32,
        source: rusqlite::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite storage error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "note database is at schema version {db_version}; this build supports up to {latest_supported}"
            ),
            Self::MigrationFailed { version, source } => {
                write!(f, "schema migration {version} failed: {source}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::MigrationFailed { source, .. } => Some(source),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;

    #[test]
    fn schema_version_error_names_both_versions() {
        let message = DbError::UnsupportedSchemaVersion {
            db_version: 7,
            latest_supported: 3,
        }
        .to_string();
        assert!(message.contains("schema version 7"));
        assert!(message.contains("up to 3"));
    }
}
