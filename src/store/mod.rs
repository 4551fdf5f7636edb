//! # Evidence Store
//!
//! A file-backed SQLite store holding proteins, the protein↔PSM evidence
//! relation, scores, descriptions, coverage, protein groups and the
//! per-pool value tables the protein report is assembled from.
//!
//! The store is created once per run and handed to each pipeline stage.
//! Mutating operations take `&mut self` and run in a single transaction, so
//! an insert batch either commits completely or leaves the store untouched,
//! and no read can interleave with a write phase. Lookup indexes are built
//! only after the batch they cover has committed.
//!
//! ## Example
//!
//! ```rust
//! use protgroup::store::EvidenceStore;
//!
//! let mut store = EvidenceStore::open_in_memory()?;
//! store.store_proteins(&["P1".to_string(), "P2".to_string()])?;
//! assert_eq!(store.count(protgroup::store::schema::PROTEINS)?, 2);
//! # Ok::<(), protgroup::store::StoreError>(())
//! ```

mod check;
mod error;
mod evidence;
mod groups;
mod pools;
pub mod schema;

#[cfg(test)]
mod tests;

pub use check::{CheckStatus, Stage, StoreCheck, StoreReport};
pub use error::StoreError;
pub use evidence::{EvidenceTuple, PeptideId, ProteinInfo};
pub use groups::{GroupContentRow, Master};
pub use pools::IsobaricQuant;

use std::path::{Path, PathBuf};

use log::debug;
use rusqlite::{Connection, ErrorCode, OpenFlags};

/// Handle to one evidence store
pub struct EvidenceStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl EvidenceStore {
    /// Create a new store file, failing if one already exists at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if path.exists() {
            return Err(StoreError::AlreadyExists(path.display().to_string()));
        }
        Self::init(Connection::open(path)?, Some(path.to_path_buf()))
    }

    /// Open an existing store file, failing if there is none at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags).map_err(|e| match e {
            rusqlite::Error::SqliteFailure(ffi, _) if ffi.code == ErrorCode::CannotOpen => {
                StoreError::NotFound(path.display().to_string())
            }
            other => StoreError::SqliteError(other),
        })?;
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Open a store that lives only for the lifetime of the handle
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        conn.execute_batch(schema::PRAGMAS)?;
        conn.execute_batch(schema::CREATE_TABLES)?;
        Ok(Self { conn, path })
    }

    /// Location of the store file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of rows in one of the tables in [`schema::ALL_TABLES`]
    pub fn count(&self, table: &str) -> Result<usize, StoreError> {
        let table = known_table(table)?;
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Whether an index with this name has been built
    pub fn has_index(&self, name: &str) -> Result<bool, StoreError> {
        let found: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(found > 0)
    }

    pub(crate) fn index_column(
        &self,
        name: &str,
        table: &str,
        column: &str,
    ) -> Result<(), StoreError> {
        debug!("Indexing {}({}) as {}", table, column, name);
        self.conn.execute_batch(&format!(
            "CREATE INDEX IF NOT EXISTS {name} ON {table}({column})"
        ))?;
        Ok(())
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn known_table(table: &str) -> Result<&'static str, StoreError> {
    schema::ALL_TABLES
        .iter()
        .copied()
        .find(|t| *t == table)
        .ok_or_else(|| StoreError::integrity("sqlite_master", table))
}

/// `?, ?, ?` placeholder list for an `IN (...)` clause
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
