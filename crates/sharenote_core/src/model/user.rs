//! User identity model.
//!
//! Users are owned by the external identity system. Core keeps just enough of
//! them to attribute history entries and resolve share targets by username.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a user.
pub type UserId = Uuid;

const USERNAME_MAX_CHARS: usize = 150;

/// Validation errors for user fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    BlankUsername,
    UsernameTooLong { chars: usize, max: usize },
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankUsername => write!(f, "username must not be blank"),
            Self::UsernameTooLong { chars, max } => {
                write!(f, "username has {chars} characters; maximum is {max}")
            }
        }
    }
}

impl Error for UserValidationError {}

/// Local projection of an externally managed user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique login name; share requests resolve against it exactly.
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
}

impl User {
    /// Creates a user with a generated id and no profile fields.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: None,
            full_name: None,
            created_at: 0,
        }
    }

    /// Full name when present and non-blank, otherwise the username.
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }

    /// Checks username shape before persistence.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.username.trim().is_empty() {
            return Err(UserValidationError::BlankUsername);
        }
        let chars = self.username.chars().count();
        if chars > USERNAME_MAX_CHARS {
            return Err(UserValidationError::UsernameTooLong {
                chars,
                max: USERNAME_MAX_CHARS,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{User, UserValidationError};

    #[test]
    fn display_name_prefers_non_blank_full_name() {
        let mut user = User::new("ada");
        assert_eq!(user.display_name(), "ada");

        user.full_name = Some("   ".to_string());
        assert_eq!(user.display_name(), "ada");

        user.full_name = Some("Ada Lovelace".to_string());
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn validate_rejects_blank_and_oversized_usernames() {
        assert_eq!(
            User::new("  ").validate(),
            Err(UserValidationError::BlankUsername)
        );
        assert!(matches!(
            User::new("u".repeat(151)).validate(),
            Err(UserValidationError::UsernameTooLong { chars: 151, .. })
        ));
        assert!(User::new("u".repeat(150)).validate().is_ok());
    }
}
