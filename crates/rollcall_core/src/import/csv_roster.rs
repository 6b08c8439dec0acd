//! Roster CSV ingestion.
//!
//! # Responsibility
//! - Turn a delimited text blob into a candidate `Roster` plus a report.
//! - Never fail on individual malformed lines; report them instead.
//!
//! # Invariants
//! - Line numbers in `skipped_lines` are 1-based and ascending.
//! - Duplicate identities resolve last-write-wins.
//! - No header detection: a header line with two fields becomes an entry.

use crate::model::identity::{normalize_display_name, Identity};
use crate::model::roster::Roster;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

const FIELD_DELIMITER: char = ',';
const UTF8_BOM: &str = "\u{feff}";

static LINE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r\n|\n").expect("valid line break regex"));

/// Import-level failures. Per-line problems are never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// Source could not be decoded as text.
    ParseFailure(String),
    /// No usable line was found.
    EmptyImport { skipped_lines: Vec<usize> },
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseFailure(message) => {
                write!(f, "an error occurred during parsing: {message}")
            }
            Self::EmptyImport { skipped_lines } => write!(
                f,
                "could not find any valid student data in the file ({} malformed lines)",
                skipped_lines.len()
            ),
        }
    }
}

impl Error for ImportError {}

/// Parsed roster and per-line diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvImport {
    pub roster: Roster,
    /// Distinct identities in `roster`.
    pub imported_count: usize,
    /// 1-based numbers of non-blank lines that produced no entry.
    pub skipped_lines: Vec<usize>,
}

impl CsvImport {
    pub fn is_empty(&self) -> bool {
        self.imported_count == 0
    }
}

/// Decodes raw bytes as UTF-8 and parses them.
///
/// # Errors
/// - `ImportError::ParseFailure` when `bytes` are not valid UTF-8.
pub fn parse_roster_bytes(bytes: &[u8]) -> Result<CsvImport, ImportError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| ImportError::ParseFailure(format!("input is not UTF-8 text: {err}")))?;
    Ok(parse_roster_csv(text))
}

/// Parses `id,name[,more name parts...]` lines into a roster.
pub fn parse_roster_csv(text: &str) -> CsvImport {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    let mut roster = Roster::new();
    let mut skipped_lines = Vec::new();

    for (index, line) in LINE_BREAK_RE.split(text).enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Some((identity, display_name)) => roster.insert_validated(identity, display_name),
            None => skipped_lines.push(index + 1),
        }
    }

    CsvImport {
        imported_count: roster.len(),
        roster,
        skipped_lines,
    }
}

fn parse_line(line: &str) -> Option<(Identity, String)> {
    let mut fields = line.split(FIELD_DELIMITER);
    let identity = fields.next()?;
    let rest: Vec<&str> = fields.collect();
    if rest.is_empty() {
        return None;
    }

    let identity = Identity::parse(identity).ok()?;
    let display_name = normalize_display_name(&rest.join(" ")).ok()?;
    Some((identity, display_name))
}
