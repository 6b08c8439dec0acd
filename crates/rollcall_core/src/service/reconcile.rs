//! Roster edits that must keep the attendance log consistent.
//!
//! # Responsibility
//! - Apply edit/delete/add use-cases to roster and attendance log together.
//!
//! # Invariants
//! - Roster validation runs first; on failure neither aggregate is touched.
//! - After any successful call, every attendance identity is in the roster.
//! - A rename without key change rewrites the arrival name snapshot in place.
//! - Persistence is the caller's job.

use crate::model::attendance::AttendanceLog;
use crate::model::identity::Identity;
use crate::model::roster::{Roster, RosterResult};

/// Result of a successful student edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOutcome {
    /// Identity key changed (not only the display name).
    pub identity_changed: bool,
    /// An arrival record existed and now follows the edited entry.
    pub arrival_rekeyed: bool,
}

/// Coordinates cross-aggregate roster edits.
pub struct ReconciliationCoordinator<'a> {
    roster: &'a mut Roster,
    log: &'a mut AttendanceLog,
}

impl<'a> ReconciliationCoordinator<'a> {
    pub fn new(roster: &'a mut Roster, log: &'a mut AttendanceLog) -> Self {
        Self { roster, log }
    }

    /// Renames and/or rekeys one student.
    ///
    /// Roster errors (`InvalidEntry`, `NotFound`, `IdentityCollision`) are
    /// returned unchanged.
    pub fn edit_student(
        &mut self,
        old_identity: &Identity,
        new_identity: &str,
        new_display_name: &str,
    ) -> RosterResult<EditOutcome> {
        let identity_changed = self
            .roster
            .rename(old_identity, new_identity, new_display_name)?;

        let new_identity = Identity::parse(new_identity)?;
        let new_display_name = self.roster.get(&new_identity).unwrap_or(new_display_name);
        let arrival_rekeyed = self
            .log
            .rekey(old_identity, &new_identity, new_display_name);

        Ok(EditOutcome {
            identity_changed,
            arrival_rekeyed,
        })
    }

    /// Removes one student and its arrival record.
    ///
    /// Returns `true` when the student was on the roster.
    pub fn delete_student(&mut self, identity: &Identity) -> bool {
        let existed = self.roster.remove(identity).is_some();
        self.log.remove(identity);
        existed
    }

    /// Removes every listed student and arrival record; returns the roster count removed.
    pub fn delete_many(&mut self, identities: &[Identity]) -> usize {
        let removed = self.roster.remove_many(identities);
        self.log.remove_many(identities);
        removed
    }

    /// Adds or overwrites one student.
    ///
    /// An existing arrival record takes the new display name.
    pub fn add_student(&mut self, identity: &str, display_name: &str) -> RosterResult<Identity> {
        self.roster.upsert(identity, display_name)?;
        let identity = Identity::parse(identity)?;
        if let Some(name) = self.roster.get(&identity) {
            self.log.rekey(&identity, &identity, name);
        }
        Ok(identity)
    }
}
