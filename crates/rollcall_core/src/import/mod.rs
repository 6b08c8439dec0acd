//! Roster import sources.
//!
//! # Responsibility
//! - Parse external roster text into candidate rosters plus diagnostics.
//! - Leave the decision to apply a parsed roster to the desk service.

pub mod csv_roster;
