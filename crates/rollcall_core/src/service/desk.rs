//! Attendance desk: the session root owning state and storage.
//!
//! # Responsibility
//! - Load roster/attendance from a `BlobStore` at open (self-healing).
//! - Run every use-case against working copies and commit them explicitly.
//!
//! # Invariants
//! - A failed operation (validation, empty import, storage) leaves both the
//!   in-memory and the persisted state unchanged.
//! - Operations that change nothing do not write to the store.

use crate::import::csv_roster::{parse_roster_bytes, parse_roster_csv, CsvImport, ImportError};
use crate::model::attendance::AttendanceLog;
use crate::model::identity::Identity;
use crate::model::roster::{Roster, RosterError};
use crate::repo::blob_store::{BlobStore, StoreError};
use crate::repo::snapshot_repo::{load_snapshot, save_snapshot};
use crate::service::clock::{Clock, SystemClock};
use crate::service::reconcile::{EditOutcome, ReconciliationCoordinator};
use crate::service::scan::{ScanIngestPipeline, ScanOutcome};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type DeskResult<T> = Result<T, DeskError>;

/// Errors surfaced to the presentation layer.
#[derive(Debug)]
pub enum DeskError {
    /// Roster validation failure (`InvalidEntry`, `NotFound`, `IdentityCollision`).
    Roster(RosterError),
    /// CSV import failure (`ParseFailure`, `EmptyImport`).
    Import(ImportError),
    /// Snapshot load/commit failure.
    Store(StoreError),
}

impl Display for DeskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Roster(err) => write!(f, "{err}"),
            Self::Import(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DeskError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Roster(err) => Some(err),
            Self::Import(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<RosterError> for DeskError {
    fn from(value: RosterError) -> Self {
        Self::Roster(value)
    }
}

impl From<ImportError> for DeskError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<StoreError> for DeskError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Summary of an applied CSV import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub imported_count: usize,
    pub skipped_lines: Vec<usize>,
    /// Arrival records dropped because their identity is not in the new roster.
    pub dropped_arrivals: usize,
}

/// Owns roster, attendance log, clock and store for one process.
pub struct AttendanceDesk<S: BlobStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    roster: Roster,
    log: AttendanceLog,
}

impl<S: BlobStore> AttendanceDesk<S, SystemClock> {
    /// Opens a desk using the local system clock.
    pub fn open(store: S) -> DeskResult<Self> {
        Self::open_with_clock(store, SystemClock)
    }
}

impl<S: BlobStore, C: Clock> AttendanceDesk<S, C> {
    /// Loads the persisted snapshot; orphaned arrivals are dropped silently.
    pub fn open_with_clock(store: S, clock: C) -> DeskResult<Self> {
        let snapshot = load_snapshot(&store)?;
        Ok(Self {
            store,
            clock,
            roster: snapshot.roster,
            log: snapshot.log,
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn attendance(&self) -> &AttendanceLog {
        &self.log
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replaces the roster from CSV text.
    ///
    /// # Errors
    /// - `ImportError::EmptyImport` when no line produced an entry.
    pub fn import_csv(&mut self, text: &str) -> DeskResult<ImportReport> {
        self.apply_import(parse_roster_csv(text))
    }

    /// Replaces the roster from raw CSV bytes.
    ///
    /// # Errors
    /// - `ImportError::ParseFailure` when bytes are not UTF-8 text.
    /// - `ImportError::EmptyImport` when no line produced an entry.
    pub fn import_csv_bytes(&mut self, bytes: &[u8]) -> DeskResult<ImportReport> {
        match parse_roster_bytes(bytes) {
            Ok(import) => self.apply_import(import),
            Err(err) => {
                warn!("event=csv_import module=service status=error error_code=parse_failure");
                Err(err.into())
            }
        }
    }

    /// Adds or overwrites one student.
    pub fn add_student(&mut self, identity: &str, display_name: &str) -> DeskResult<Identity> {
        let result = self.apply(|roster, log| {
            ReconciliationCoordinator::new(roster, log)
                .add_student(identity, display_name)
                .map_err(DeskError::from)
        });
        log_result("student_add", &result);
        result
    }

    /// Edits one student's identity and/or display name.
    pub fn edit_student(
        &mut self,
        old_identity: &str,
        new_identity: &str,
        new_display_name: &str,
    ) -> DeskResult<EditOutcome> {
        let result = self.apply(|roster, log| {
            let old_identity = Identity::parse(old_identity).map_err(RosterError::from)?;
            ReconciliationCoordinator::new(roster, log)
                .edit_student(&old_identity, new_identity, new_display_name)
                .map_err(DeskError::from)
        });
        if let Ok(outcome) = &result {
            info!(
                "event=student_edit module=service status=ok identity_changed={} arrival_rekeyed={}",
                outcome.identity_changed, outcome.arrival_rekeyed
            );
        } else {
            log_result("student_edit", &result);
        }
        result
    }

    /// Deletes one student and its arrival. Absent identities are a no-op.
    pub fn delete_student(&mut self, identity: &str) -> DeskResult<bool> {
        let Ok(identity) = Identity::parse(identity) else {
            return Ok(false);
        };
        let result = self.apply(|roster, log| {
            Ok(ReconciliationCoordinator::new(roster, log).delete_student(&identity))
        });
        log_result("student_delete", &result);
        result
    }

    /// Deletes every listed student; blank or unknown identities are skipped.
    pub fn delete_many<T: AsRef<str>>(&mut self, identities: &[T]) -> DeskResult<usize> {
        let identities: Vec<Identity> = identities
            .iter()
            .filter_map(|value| Identity::parse(value.as_ref()).ok())
            .collect();
        let result = self.apply(|roster, log| {
            Ok(ReconciliationCoordinator::new(roster, log).delete_many(&identities))
        });
        if let Ok(removed) = &result {
            info!(
                "event=student_delete module=service status=ok mode=batch requested={} removed={}",
                identities.len(),
                removed
            );
        } else {
            log_result("student_delete", &result);
        }
        result
    }

    /// Ingests one decoded scan candidate.
    ///
    /// Only `FirstArrival` writes to the store.
    pub fn scan(&mut self, candidate: &str) -> DeskResult<ScanOutcome> {
        let clock = &self.clock;
        let result = Self::apply_parts(&self.store, &mut self.roster, &mut self.log, |r, l| {
            Ok(ScanIngestPipeline::new(r, l, clock).ingest(candidate))
        });
        match &result {
            Ok(outcome) => info!(
                "event=scan_ingest module=service status=ok outcome={}",
                outcome_label(outcome)
            ),
            Err(err) => error!("event=scan_ingest module=service status=error error={err}"),
        }
        result
    }

    fn apply_import(&mut self, import: CsvImport) -> DeskResult<ImportReport> {
        let started_at = Instant::now();
        if import.is_empty() {
            warn!(
                "event=csv_import module=service status=error error_code=empty_import skipped_lines={}",
                import.skipped_lines.len()
            );
            return Err(ImportError::EmptyImport {
                skipped_lines: import.skipped_lines,
            }
            .into());
        }

        let CsvImport {
            roster: new_roster,
            imported_count,
            skipped_lines,
        } = import;
        let result = self.apply(|roster, log| {
            roster.replace_all(new_roster);
            Ok(log.retain_roster(roster))
        });

        match result {
            Ok(dropped_arrivals) => {
                info!(
                    "event=csv_import module=service status=ok imported={} skipped={} dropped_arrivals={} duration_ms={}",
                    imported_count,
                    skipped_lines.len(),
                    dropped_arrivals,
                    started_at.elapsed().as_millis()
                );
                Ok(ImportReport {
                    imported_count,
                    skipped_lines,
                    dropped_arrivals,
                })
            }
            Err(err) => {
                error!("event=csv_import module=service status=error error={err}");
                Err(err)
            }
        }
    }

    fn apply<T, F>(&mut self, op: F) -> DeskResult<T>
    where
        F: FnOnce(&mut Roster, &mut AttendanceLog) -> DeskResult<T>,
    {
        Self::apply_parts(&self.store, &mut self.roster, &mut self.log, op)
    }

    /// Runs `op` on copies, commits when anything changed, then swaps copies in.
    fn apply_parts<T, F>(
        store: &S,
        roster: &mut Roster,
        log: &mut AttendanceLog,
        op: F,
    ) -> DeskResult<T>
    where
        F: FnOnce(&mut Roster, &mut AttendanceLog) -> DeskResult<T>,
    {
        let mut next_roster = roster.clone();
        let mut next_log = log.clone();
        let value = op(&mut next_roster, &mut next_log)?;

        if next_roster == *roster && next_log == *log {
            return Ok(value);
        }

        let started_at = Instant::now();
        if let Err(err) = save_snapshot(store, &next_roster, &next_log) {
            error!(
                "event=snapshot_commit module=service status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
        info!(
            "event=snapshot_commit module=service status=ok roster_count={} attendance_count={} duration_ms={}",
            next_roster.len(),
            next_log.len(),
            started_at.elapsed().as_millis()
        );

        *roster = next_roster;
        *log = next_log;
        Ok(value)
    }
}

fn log_result<T>(event: &str, result: &DeskResult<T>) {
    match result {
        Ok(_) => info!("event={event} module=service status=ok"),
        Err(DeskError::Store(err)) => {
            error!("event={event} module=service status=error error={err}")
        }
        Err(err) => warn!(
            "event={event} module=service status=rejected error_code={}",
            error_code(err)
        ),
    }
}

fn error_code(err: &DeskError) -> &'static str {
    match err {
        DeskError::Roster(RosterError::InvalidEntry(_)) => "invalid_entry",
        DeskError::Roster(RosterError::NotFound(_)) => "not_found",
        DeskError::Roster(RosterError::IdentityCollision(_)) => "identity_collision",
        DeskError::Import(ImportError::ParseFailure(_)) => "parse_failure",
        DeskError::Import(ImportError::EmptyImport { .. }) => "empty_import",
        DeskError::Store(_) => "store_failure",
    }
}

fn outcome_label(outcome: &ScanOutcome) -> &'static str {
    match outcome {
        ScanOutcome::NotInRoster { .. } => "not_in_roster",
        ScanOutcome::FirstArrival { .. } => "first_arrival",
        ScanOutcome::AlreadyArrived { .. } => "already_arrived",
    }
}
