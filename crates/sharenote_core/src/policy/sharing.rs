//! Note sharing policy.
//!
//! # Invariants
//! - Owners can read, write and share.
//! - Shared users can read and write, but not share further.
//! - Everyone else can do nothing.

use crate::model::note::Note;
use crate::model::user::UserId;
use std::fmt::{Display, Formatter};

/// Action a user attempts on a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteAction {
    Read,
    Write,
    Share,
}

impl NoteAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Share => "share",
        }
    }
}

impl Display for NoteAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn can_read(user: UserId, note: &Note) -> bool {
    note.is_owned_by(user) || note.is_shared_with(user)
}

/// Shared users may edit, which also makes them history authors.
pub fn can_write(user: UserId, note: &Note) -> bool {
    note.is_owned_by(user) || note.is_shared_with(user)
}

pub fn can_share(user: UserId, note: &Note) -> bool {
    note.is_owned_by(user)
}

/// Dispatches to the predicate for `action`.
pub fn is_allowed(user: UserId, note: &Note, action: NoteAction) -> bool {
    match action {
        NoteAction::Read => can_read(user, note),
        NoteAction::Write => can_write(user, note),
        NoteAction::Share => can_share(user, note),
    }
}

#[cfg(test)]
mod tests {
    use super::{is_allowed, NoteAction};
    use crate::model::note::Note;
    use uuid::Uuid;

    #[test]
    fn access_matrix_matches_roles() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let mut note = Note::new(owner, "Plan", "step one");
        note.shared_with.push(member);

        let expected = [
            (owner, [true, true, true]),
            (member, [true, true, false]),
            (stranger, [false, false, false]),
        ];
        for (user, [read, write, share]) in expected {
            assert_eq!(is_allowed(user, &note, NoteAction::Read), read);
            assert_eq!(is_allowed(user, &note, NoteAction::Write), write);
            assert_eq!(is_allowed(user, &note, NoteAction::Share), share);
        }
    }
}
