//! Domain model for roster membership and arrivals.
//!
//! # Responsibility
//! - Define the two owned aggregates (`Roster`, `AttendanceLog`).
//! - Define the validated `Identity` join key between them.
//!
//! # Invariants
//! - Every attendance identity must have a roster entry once an operation
//!   completes; cross-aggregate edits go through the reconciliation service.

pub mod attendance;
pub mod identity;
pub mod roster;
