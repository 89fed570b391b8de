//! User repository contracts and SQLite implementation.
//!
//! Users come from the external identity system; this store only mirrors
//! what notes need: ids for attribution and usernames for share lookups.

use crate::model::user::{User, UserId};
use crate::repo::{ensure_tables, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT
    uuid,
    username,
    email,
    full_name,
    created_at
FROM users";

/// Repository interface for user lookups.
pub trait UserRepository {
    /// Inserts a user and returns the stored record.
    fn create_user(&self, user: &User) -> RepoResult<User>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Exact, case-sensitive username match.
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["users"])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<User> {
        user.validate()?;
        if find_user_by_username(self.conn, &user.username)?.is_some() {
            return Err(RepoError::DuplicateUsername(user.username.clone()));
        }

        self.conn.execute(
            "INSERT INTO users (uuid, username, email, full_name)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                user.id.to_string(),
                user.username.as_str(),
                user.email.as_deref(),
                user.full_name.as_deref(),
            ],
        )?;

        load_user(self.conn, user.id)?.ok_or(RepoError::UserNotFound(user.id))
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        load_user(self.conn, id)
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        find_user_by_username(self.conn, username)
    }
}

pub(crate) fn load_user(conn: &Connection, id: UserId) -> RepoResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("{USER_SELECT_SQL} WHERE uuid = ?1;"),
            [id.to_string()],
            read_user_columns,
        )
        .optional()?;
    user.map(UserColumns::into_user).transpose()
}

pub(crate) fn find_user_by_username(conn: &Connection, username: &str) -> RepoResult<Option<User>> {
    let user = conn
        .query_row(
            &format!("{USER_SELECT_SQL} WHERE username = ?1;"),
            [username],
            read_user_columns,
        )
        .optional()?;
    user.map(UserColumns::into_user).transpose()
}

/// Users sharing the note, ordered by username.
pub(crate) fn load_shared_users(conn: &Connection, note_uuid: &str) -> RepoResult<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT u.uuid, u.username, u.email, u.full_name, u.created_at
         FROM note_shares s
         INNER JOIN users u ON u.uuid = s.user_uuid
         WHERE s.note_uuid = ?1
         ORDER BY u.username ASC;",
    )?;
    let rows = stmt.query_map([note_uuid], read_user_columns)?;
    let mut users = Vec::new();
    for row in rows {
        users.push(row?.into_user()?);
    }
    Ok(users)
}

// Raw columns; uuid parsing happens outside the rusqlite row callback so it
// can report `RepoError::InvalidData`.
struct UserColumns {
    uuid: String,
    username: String,
    email: Option<String>,
    full_name: Option<String>,
    created_at: i64,
}

impl UserColumns {
    fn into_user(self) -> RepoResult<User> {
        Ok(User {
            id: parse_uuid(&self.uuid, "users.uuid")?,
            username: self.username,
            email: self.email,
            full_name: self.full_name,
            created_at: self.created_at,
        })
    }
}

fn read_user_columns(row: &Row<'_>) -> rusqlite::Result<UserColumns> {
    Ok(UserColumns {
        uuid: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        full_name: row.get(3)?,
        created_at: row.get(4)?,
    })
}
