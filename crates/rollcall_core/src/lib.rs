//! Core domain logic for Rollcall.
//! This crate is the single source of truth for roster/attendance invariants.

pub mod db;
pub mod import;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use import::csv_roster::{parse_roster_bytes, parse_roster_csv, CsvImport, ImportError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::attendance::{ArrivalRecord, AttendanceLog};
pub use model::identity::{Identity, InvalidEntryKind};
pub use model::roster::{Roster, RosterError, RosterResult};
pub use repo::blob_store::{BlobStore, MemoryBlobStore, SqliteBlobStore, StoreError, StoreResult};
pub use repo::snapshot_repo::{load_snapshot, save_snapshot, LoadedSnapshot};
pub use service::clock::{Clock, FixedClock, SystemClock};
pub use service::desk::{AttendanceDesk, DeskError, DeskResult, ImportReport};
pub use service::reconcile::{EditOutcome, ReconciliationCoordinator};
pub use service::scan::{ScanIngestPipeline, ScanOutcome, StatusKind};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
