//! Domain model for users, notes and note edit history.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Validate user-provided fields before they reach storage.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID.
//! - A note's owner never changes after creation.
//! - History entries are immutable once written.

pub mod history;
pub mod note;
pub mod user;
