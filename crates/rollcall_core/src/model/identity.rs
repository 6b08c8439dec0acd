//! Identity key shared by roster and attendance log.
//!
//! # Responsibility
//! - Validate user-supplied identity tokens once, at the boundary.
//! - Provide the only key type accepted by roster/log maps.
//!
//! # Invariants
//! - An `Identity` is always trimmed and never empty.
//! - Comparison is exact (case-sensitive) on the trimmed token.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Which field of a roster entry failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidEntryKind {
    /// Identity is blank after trim.
    EmptyIdentity,
    /// Display name is blank after trim.
    EmptyDisplayName,
}

impl Display for InvalidEntryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyIdentity => write!(f, "identity must not be blank"),
            Self::EmptyDisplayName => write!(f, "display name must not be blank"),
        }
    }
}

impl Error for InvalidEntryKind {}

/// Validated roster identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity(String);

impl Identity {
    /// Parses and normalizes one identity token.
    ///
    /// # Errors
    /// - Returns `InvalidEntryKind::EmptyIdentity` when `value` is blank.
    pub fn parse(value: &str) -> Result<Self, InvalidEntryKind> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(InvalidEntryKind::EmptyIdentity);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Normalizes a display name: trims and rejects blank values.
pub fn normalize_display_name(value: &str) -> Result<String, InvalidEntryKind> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InvalidEntryKind::EmptyDisplayName);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_display_name, Identity, InvalidEntryKind};

    #[test]
    fn parse_trims_surrounding_whitespace() {
        let id = Identity::parse("  42 \t").unwrap();
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn parse_rejects_blank_values() {
        assert_eq!(
            Identity::parse("   ").unwrap_err(),
            InvalidEntryKind::EmptyIdentity
        );
        assert_eq!(
            Identity::parse("").unwrap_err(),
            InvalidEntryKind::EmptyIdentity
        );
    }

    #[test]
    fn identities_are_case_sensitive() {
        assert_ne!(Identity::parse("a1").unwrap(), Identity::parse("A1").unwrap());
    }

    #[test]
    fn display_name_is_trimmed_and_must_not_be_blank() {
        assert_eq!(normalize_display_name(" Ana Lee ").unwrap(), "Ana Lee");
        assert_eq!(
            normalize_display_name(" \n").unwrap_err(),
            InvalidEntryKind::EmptyDisplayName
        );
    }
}
