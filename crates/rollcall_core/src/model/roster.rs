//! Roster aggregate: identity -> display name membership.
//!
//! # Responsibility
//! - Own the current roster membership set.
//! - Enforce entry validation and key uniqueness before any mutation.
//!
//! # Invariants
//! - Keys are unique (map semantics); `rename` refuses to overwrite another key.
//! - Display names are trimmed and non-empty.
//! - Failed operations leave the roster unchanged.

use crate::model::identity::{normalize_display_name, Identity, InvalidEntryKind};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RosterResult<T> = Result<T, RosterError>;

/// Errors from roster mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// Identity or display name is blank after trim.
    InvalidEntry(InvalidEntryKind),
    /// Edit target does not exist.
    NotFound(Identity),
    /// Rename target key already belongs to another entry.
    IdentityCollision(Identity),
}

impl Display for RosterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEntry(kind) => write!(f, "invalid roster entry: {kind}"),
            Self::NotFound(id) => write!(f, "student not found in roster: {id}"),
            Self::IdentityCollision(id) => write!(f, "student id already in use: {id}"),
        }
    }
}

impl Error for RosterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEntry(kind) => Some(kind),
            Self::NotFound(_) | Self::IdentityCollision(_) => None,
        }
    }
}

impl From<InvalidEntryKind> for RosterError {
    fn from(value: InvalidEntryKind) -> Self {
        Self::InvalidEntry(value)
    }
}

/// Current roster membership.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    entries: BTreeMap<Identity, String>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites one entry.
    ///
    /// Returns the previous display name when the identity already existed.
    pub fn upsert(&mut self, identity: &str, display_name: &str) -> RosterResult<Option<String>> {
        let identity = Identity::parse(identity)?;
        let display_name = normalize_display_name(display_name)?;
        Ok(self.entries.insert(identity, display_name))
    }

    /// Replaces `old_identity` with `(new_identity, new_display_name)`.
    ///
    /// Returns `true` when the identity key changed.
    ///
    /// # Errors
    /// - `InvalidEntry` when the new identity or name is blank.
    /// - `NotFound` when `old_identity` is absent.
    /// - `IdentityCollision` when the key changes onto an existing entry.
    pub fn rename(
        &mut self,
        old_identity: &Identity,
        new_identity: &str,
        new_display_name: &str,
    ) -> RosterResult<bool> {
        let new_identity = Identity::parse(new_identity)?;
        let new_display_name = normalize_display_name(new_display_name)?;

        if !self.entries.contains_key(old_identity) {
            return Err(RosterError::NotFound(old_identity.clone()));
        }

        let key_changed = &new_identity != old_identity;
        if key_changed && self.entries.contains_key(&new_identity) {
            return Err(RosterError::IdentityCollision(new_identity));
        }

        self.entries.remove(old_identity);
        self.entries.insert(new_identity, new_display_name);
        Ok(key_changed)
    }

    /// Removes one entry. Absent identities are a no-op.
    pub fn remove(&mut self, identity: &Identity) -> Option<String> {
        self.entries.remove(identity)
    }

    /// Removes every listed identity that is present; returns the removed count.
    pub fn remove_many<'a, I>(&mut self, identities: I) -> usize
    where
        I: IntoIterator<Item = &'a Identity>,
    {
        identities
            .into_iter()
            .filter(|identity| self.entries.remove(*identity).is_some())
            .count()
    }

    /// Swaps the whole membership set for `new_roster`.
    pub fn replace_all(&mut self, new_roster: Roster) {
        *self = new_roster;
    }

    pub fn get(&self, identity: &Identity) -> Option<&str> {
        self.entries.get(identity).map(String::as_str)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&Identity, &str)> {
        self.entries
            .iter()
            .map(|(identity, name)| (identity, name.as_str()))
    }

    pub(crate) fn insert_validated(&mut self, identity: Identity, display_name: String) {
        self.entries.insert(identity, display_name);
    }
}
