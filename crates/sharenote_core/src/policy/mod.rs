//! Authorization predicates for note access.

pub mod sharing;
