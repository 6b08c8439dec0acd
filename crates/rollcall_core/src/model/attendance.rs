//! Attendance log aggregate: identity -> single arrival record.
//!
//! # Responsibility
//! - Hold at most one arrival record per identity.
//! - Provide record/rekey/remove primitives; dedup policy lives in callers.
//!
//! # Invariants
//! - `rekey` preserves the original arrival time.
//! - `record` never overwrites; the first arrival's time is kept.
//! - Records are only created by the scan pipeline.

use crate::model::identity::Identity;
use crate::model::roster::Roster;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// One arrival event, with the display name captured at arrival time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivalRecord {
    /// Display name snapshot; follows roster renames.
    pub display_name: String,
    /// Formatted local wall-clock time of the arrival.
    pub time: String,
}

/// First arrival per identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceLog {
    records: BTreeMap<Identity, ArrivalRecord>,
}

impl AttendanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a first arrival for `identity`.
    ///
    /// Returns the existing record, left untouched, when `identity` already
    /// arrived; `None` when a new record was inserted.
    pub fn record(
        &mut self,
        identity: Identity,
        display_name: impl Into<String>,
        time: impl Into<String>,
    ) -> Option<ArrivalRecord> {
        match self.records.entry(identity) {
            Entry::Occupied(existing) => Some(existing.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(ArrivalRecord {
                    display_name: display_name.into(),
                    time: time.into(),
                });
                None
            }
        }
    }

    /// Moves the record under `old_identity` to `new_identity`.
    ///
    /// Returns `true` when a record existed and was moved.
    pub fn rekey(
        &mut self,
        old_identity: &Identity,
        new_identity: &Identity,
        new_display_name: &str,
    ) -> bool {
        let Some(mut record) = self.records.remove(old_identity) else {
            return false;
        };
        record.display_name = new_display_name.to_string();
        self.records.insert(new_identity.clone(), record);
        true
    }

    pub fn remove(&mut self, identity: &Identity) -> Option<ArrivalRecord> {
        self.records.remove(identity)
    }

    pub fn remove_many<'a, I>(&mut self, identities: I) -> usize
    where
        I: IntoIterator<Item = &'a Identity>,
    {
        identities
            .into_iter()
            .filter(|identity| self.records.remove(*identity).is_some())
            .count()
    }

    /// Drops records whose identity is not in `roster`; returns the dropped count.
    pub fn retain_roster(&mut self, roster: &Roster) -> usize {
        let before = self.records.len();
        self.records.retain(|identity, _| roster.contains(identity));
        before - self.records.len()
    }

    pub fn get(&self, identity: &Identity) -> Option<&ArrivalRecord> {
        self.records.get(identity)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.records.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identity, &ArrivalRecord)> {
        self.records.iter()
    }
}
