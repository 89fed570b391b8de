//! Line-level diffing of note bodies.
//!
//! # Responsibility
//! - Turn an (old text, new text) pair into ordered line change records.
//! - Stay pure: no I/O, no clock, no randomness.
//!
//! # Invariants
//! - Identical inputs produce no change records.
//! - Record positions index the full alignment, unchanged lines included.
//! - Only line granularity is supported; there are no word or char diffs.

pub mod line_diff;

pub use line_diff::{
    apply_changes, classify, compute_diff, split_lines, tokenize, ChangeKind, ChangeRecord,
    DiffToken,
};
