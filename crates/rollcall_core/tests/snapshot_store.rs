use rollcall_core::db::migrations::latest_version;
use rollcall_core::db::{open_db, open_db_in_memory, DbError};
use rollcall_core::{
    load_snapshot, parse_roster_csv, save_snapshot, AttendanceDesk, AttendanceLog, BlobStore,
    FixedClock, Identity, Roster, SqliteBlobStore, StoreError,
};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_documents_table() {
    let conn = open_db_in_memory().unwrap();

    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());
    assert!(SqliteBlobStore::try_new(&conn).is_ok());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteBlobStore::try_new(&conn) {
        Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn store_rejects_connection_without_documents_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteBlobStore::try_new(&conn),
        Err(StoreError::MissingRequiredTable("documents"))
    ));
}

#[test]
fn set_many_overwrites_existing_documents() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBlobStore::try_new(&conn).unwrap();

    store
        .set_many(&[("a", "1".to_string()), ("b", "2".to_string())])
        .unwrap();
    store.set_many(&[("a", "3".to_string())]).unwrap();

    assert_eq!(store.get("a").unwrap().as_deref(), Some("3"));
    assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    assert_eq!(store.get("missing").unwrap(), None);
}

#[test]
fn csv_roster_round_trips_through_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rollcall.sqlite3");
    let import = parse_roster_csv("7,Sam\r\n8,Kim,Park\n9,Lee, Min Ho \n");

    {
        let conn = open_db(&path).unwrap();
        let store = SqliteBlobStore::try_new(&conn).unwrap();
        let mut roster = Roster::new();
        roster.replace_all(import.roster.clone());
        save_snapshot(&store, &roster, &AttendanceLog::new()).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let loaded = load_snapshot(&SqliteBlobStore::try_new(&conn).unwrap()).unwrap();
    assert_eq!(loaded.roster, import.roster);
    assert_eq!(
        loaded.roster.get(&Identity::parse("9").unwrap()),
        Some("Lee  Min Ho")
    );
}

#[test]
fn orphaned_arrival_written_by_interrupted_writer_is_healed_on_open() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteBlobStore::try_new(&conn).unwrap();
    store
        .set_many(&[
            ("roster", r#"{"2":"Bo"}"#.to_string()),
            (
                "attendance",
                r#"{"1":{"displayName":"Ana","time":"08:00:00"},"2":{"name":"Bo","time":"08:01:00"}}"#
                    .to_string(),
            ),
        ])
        .unwrap();

    let desk = AttendanceDesk::open_with_clock(store, FixedClock::new("09:00:00")).unwrap();
    assert_eq!(desk.attendance().len(), 1);
    let bo = desk
        .attendance()
        .get(&Identity::parse("2").unwrap())
        .unwrap();
    assert_eq!(bo.display_name, "Bo");
    assert_eq!(bo.time, "08:01:00");
}
