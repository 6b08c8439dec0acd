//! Roster and attendance snapshot documents.
//!
//! # Responsibility
//! - Encode/decode the two JSON documents stored in a `BlobStore`.
//! - Restore a consistent state on load, dropping orphaned arrival records.
//!
//! # Invariants
//! - Both documents are written in one `set_many` call.
//! - Read paths reject structurally invalid documents instead of masking them.
//! - Orphaned attendance entries are healed silently (logged, not surfaced).

use crate::model::attendance::AttendanceLog;
use crate::model::identity::{normalize_display_name, Identity};
use crate::model::roster::Roster;
use crate::repo::blob_store::{BlobStore, StoreError, StoreResult};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key of the identity -> display name document.
pub const ROSTER_DOCUMENT_KEY: &str = "roster";
/// Key of the identity -> arrival record document.
pub const ATTENDANCE_DOCUMENT_KEY: &str = "attendance";

type RosterDocument = BTreeMap<String, String>;
type AttendanceDocument = BTreeMap<String, ArrivalDocument>;

/// Wire shape of one arrival record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ArrivalDocument {
    #[serde(rename = "displayName", alias = "name")]
    display_name: String,
    time: String,
}

/// State restored from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedSnapshot {
    pub roster: Roster,
    pub log: AttendanceLog,
    /// Attendance entries dropped because their identity left the roster.
    pub healed_orphans: usize,
}

/// Loads both documents; missing documents load as empty.
pub fn load_snapshot<S: BlobStore + ?Sized>(store: &S) -> StoreResult<LoadedSnapshot> {
    let roster = match store.get(ROSTER_DOCUMENT_KEY)? {
        Some(body) => decode_roster(&body)?,
        None => Roster::new(),
    };
    let mut log = match store.get(ATTENDANCE_DOCUMENT_KEY)? {
        Some(body) => decode_attendance(&body)?,
        None => AttendanceLog::new(),
    };

    let healed_orphans = log.retain_roster(&roster);
    if healed_orphans > 0 {
        warn!(
            "event=snapshot_load module=repo status=healed healed_orphans={}",
            healed_orphans
        );
    }
    info!(
        "event=snapshot_load module=repo status=ok roster_count={} attendance_count={}",
        roster.len(),
        log.len()
    );

    Ok(LoadedSnapshot {
        roster,
        log,
        healed_orphans,
    })
}

/// Writes both documents in one atomic store call.
pub fn save_snapshot<S: BlobStore + ?Sized>(
    store: &S,
    roster: &Roster,
    log: &AttendanceLog,
) -> StoreResult<()> {
    let documents = [
        (ROSTER_DOCUMENT_KEY, encode_roster(roster)?),
        (ATTENDANCE_DOCUMENT_KEY, encode_attendance(log)?),
    ];
    store.set_many(&documents)
}

fn encode_roster(roster: &Roster) -> StoreResult<String> {
    let document: RosterDocument = roster
        .iter()
        .map(|(identity, name)| (identity.to_string(), name.to_string()))
        .collect();
    serde_json::to_string(&document).map_err(|err| {
        StoreError::InvalidData(format!("failed to encode roster document: {err}"))
    })
}

fn encode_attendance(log: &AttendanceLog) -> StoreResult<String> {
    let document: AttendanceDocument = log
        .iter()
        .map(|(identity, record)| {
            (
                identity.to_string(),
                ArrivalDocument {
                    display_name: record.display_name.clone(),
                    time: record.time.clone(),
                },
            )
        })
        .collect();
    serde_json::to_string(&document).map_err(|err| {
        StoreError::InvalidData(format!("failed to encode attendance document: {err}"))
    })
}

fn decode_roster(body: &str) -> StoreResult<Roster> {
    let document: RosterDocument = serde_json::from_str(body)
        .map_err(|err| StoreError::InvalidData(format!("roster document: {err}")))?;

    let mut roster = Roster::new();
    for (raw_identity, raw_name) in document {
        let identity = parse_identity(&raw_identity, ROSTER_DOCUMENT_KEY)?;
        let name = normalize_display_name(&raw_name).map_err(|_| {
            StoreError::InvalidData(format!(
                "blank display name for `{raw_identity}` in {ROSTER_DOCUMENT_KEY}"
            ))
        })?;
        roster.insert_validated(identity, name);
    }
    Ok(roster)
}

fn decode_attendance(body: &str) -> StoreResult<AttendanceLog> {
    let document: AttendanceDocument = serde_json::from_str(body)
        .map_err(|err| StoreError::InvalidData(format!("attendance document: {err}")))?;

    let mut log = AttendanceLog::new();
    for (raw_identity, arrival) in document {
        let identity = parse_identity(&raw_identity, ATTENDANCE_DOCUMENT_KEY)?;
        log.record(identity, arrival.display_name, arrival.time);
    }
    Ok(log)
}

fn parse_identity(value: &str, document: &str) -> StoreResult<Identity> {
    Identity::parse(value)
        .map_err(|_| StoreError::InvalidData(format!("blank identity key in {document}")))
}
