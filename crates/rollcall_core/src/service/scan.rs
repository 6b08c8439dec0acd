//! Scan ingestion: decoded candidate strings -> arrival records.
//!
//! # Responsibility
//! - Validate candidates against the roster.
//! - Record first arrivals; absorb repeated scans without touching the log.
//!
//! # Invariants
//! - Never panics or errors on garbage input; unknown candidates are `NotInRoster`.
//! - An existing arrival keeps its original time.

use crate::model::attendance::AttendanceLog;
use crate::model::identity::Identity;
use crate::model::roster::Roster;
use crate::service::clock::Clock;

/// Severity bucket for presenting an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Warning,
    Error,
}

/// Result of ingesting one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Candidate is blank or not a roster identity.
    NotInRoster { candidate: String },
    /// New arrival record created.
    FirstArrival {
        identity: Identity,
        display_name: String,
        time: String,
    },
    /// Arrival already recorded; `time` is the original arrival time.
    AlreadyArrived {
        identity: Identity,
        display_name: String,
        time: String,
    },
}

impl ScanOutcome {
    pub fn status(&self) -> StatusKind {
        match self {
            Self::NotInRoster { .. } => StatusKind::Error,
            Self::FirstArrival { .. } => StatusKind::Success,
            Self::AlreadyArrived { .. } => StatusKind::Warning,
        }
    }

    /// User-facing status line.
    pub fn message(&self) -> String {
        match self {
            Self::NotInRoster { .. } => "Error: Student ID not found in roster.".to_string(),
            Self::FirstArrival {
                display_name, time, ..
            } => format!("Checked in {display_name} at {time}"),
            Self::AlreadyArrived { display_name, .. } => {
                format!("{display_name} is already checked in.")
            }
        }
    }

    /// Whether this outcome changed the attendance log.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::FirstArrival { .. })
    }
}

/// One-shot pipeline over borrowed state.
pub struct ScanIngestPipeline<'a, C: Clock + ?Sized> {
    roster: &'a Roster,
    log: &'a mut AttendanceLog,
    clock: &'a C,
}

impl<'a, C: Clock + ?Sized> ScanIngestPipeline<'a, C> {
    pub fn new(roster: &'a Roster, log: &'a mut AttendanceLog, clock: &'a C) -> Self {
        Self { roster, log, clock }
    }

    pub fn ingest(&mut self, candidate: &str) -> ScanOutcome {
        let Some((identity, display_name)) = self.lookup(candidate) else {
            return ScanOutcome::NotInRoster {
                candidate: candidate.to_string(),
            };
        };

        let time = self.clock.now();
        match self
            .log
            .record(identity.clone(), display_name.clone(), time.clone())
        {
            Some(existing) => ScanOutcome::AlreadyArrived {
                identity,
                display_name,
                time: existing.time,
            },
            None => ScanOutcome::FirstArrival {
                identity,
                display_name,
                time,
            },
        }
    }

    fn lookup(&self, candidate: &str) -> Option<(Identity, String)> {
        let identity = Identity::parse(candidate).ok()?;
        let display_name = self.roster.get(&identity)?.to_string();
        Some((identity, display_name))
    }
}

#[cfg(test)]
mod tests {
    use super::{ScanIngestPipeline, ScanOutcome, StatusKind};
    use crate::model::attendance::AttendanceLog;
    use crate::model::identity::Identity;
    use crate::model::roster::Roster;
    use crate::service::clock::FixedClock;

    fn roster() -> Roster {
        let mut roster = Roster::new();
        roster.upsert("1", "Ana Lee").unwrap();
        roster
    }

    #[test]
    fn first_scan_records_arrival() {
        let roster = roster();
        let mut log = AttendanceLog::new();
        let clock = FixedClock::new("08:00:00");

        let outcome = ScanIngestPipeline::new(&roster, &mut log, &clock).ingest("1");

        assert_eq!(outcome.status(), StatusKind::Success);
        assert_eq!(outcome.message(), "Checked in Ana Lee at 08:00:00");
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn repeated_scan_keeps_first_time() {
        let roster = roster();
        let mut log = AttendanceLog::new();

        ScanIngestPipeline::new(&roster, &mut log, &FixedClock::new("08:00:00")).ingest("1");
        let outcome =
            ScanIngestPipeline::new(&roster, &mut log, &FixedClock::new("08:30:00")).ingest("1");

        assert!(matches!(
            &outcome,
            ScanOutcome::AlreadyArrived { time, .. } if time == "08:00:00"
        ));
        assert_eq!(outcome.message(), "Ana Lee is already checked in.");
        let id = Identity::parse("1").unwrap();
        assert_eq!(log.get(&id).unwrap().time, "08:00:00");
    }

    #[test]
    fn padded_candidate_matches_trimmed_identity() {
        let roster = roster();
        let mut log = AttendanceLog::new();
        let clock = FixedClock::new("08:00:00");

        let outcome = ScanIngestPipeline::new(&roster, &mut log, &clock).ingest(" 1\r\n");

        assert!(matches!(
            &outcome,
            ScanOutcome::FirstArrival { identity, .. } if identity.as_str() == "1"
        ));
        assert!(log.contains(&Identity::parse("1").unwrap()));
    }

    #[test]
    fn garbage_candidates_are_not_in_roster() {
        let roster = roster();
        let mut log = AttendanceLog::new();
        let clock = FixedClock::new("08:00:00");
        let mut pipeline = ScanIngestPipeline::new(&roster, &mut log, &clock);

        for candidate in ["", "   ", "https://example.invalid/?q=1", "\u{0}\u{7f}", "2"] {
            let outcome = pipeline.ingest(candidate);
            assert_eq!(outcome.status(), StatusKind::Error);
            assert!(!outcome.is_mutation());
        }
        assert!(log.is_empty());
    }
}
