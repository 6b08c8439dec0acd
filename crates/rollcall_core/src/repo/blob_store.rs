//! Whole-document key/value storage.
//!
//! # Responsibility
//! - Provide synchronous get/set of opaque text documents by key.
//! - Keep SQLite details inside the persistence boundary.
//!
//! # Invariants
//! - `set_many` is all-or-nothing: either every document is written or none.
//! - Stores are only built on connections at the latest schema version.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from document storage and snapshot decoding.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted document cannot be converted to a valid model.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "document store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "document store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "document store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted snapshot: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synchronous whole-document store.
pub trait BlobStore {
    /// Loads one document body, `None` when the key was never written.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    /// Writes every `(key, body)` pair atomically.
    fn set_many(&self, documents: &[(&str, String)]) -> StoreResult<()>;
}

/// SQLite-backed document store over the `documents` table.
pub struct SqliteBlobStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBlobStore<'conn> {
    /// Creates a store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_documents_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BlobStore for SqliteBlobStore<'_> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(body)
    }

    fn set_many(&self, documents: &[(&str, String)]) -> StoreResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for (key, body) in documents {
            tx.execute(
                "INSERT INTO documents (key, body)
                 VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    body = excluded.body,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![key, body],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Process-local document store, used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    documents: RefCell<BTreeMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.documents.borrow().get(key).cloned())
    }

    fn set_many(&self, documents: &[(&str, String)]) -> StoreResult<()> {
        let mut stored = self.documents.borrow_mut();
        for (key, body) in documents {
            stored.insert((*key).to_string(), body.clone());
        }
        Ok(())
    }
}

fn ensure_documents_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "documents")? {
        return Err(StoreError::MissingRequiredTable("documents"));
    }

    for column in ["key", "body", "updated_at"] {
        if !table_has_column(conn, "documents", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "documents",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
