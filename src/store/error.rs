/// Errors that can occur while reading or writing the evidence store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// A row references an entity that has not been stored yet
    #[error("Integrity error: {table} references missing {key}")]
    Integrity {
        /// Table the failing row was written to or read from
        table: &'static str,
        /// Key of the missing referenced entity
        key: String,
    },

    /// A plain insert hit a key that is already stored
    #[error("Duplicate key in {table}: {key}")]
    Duplicate {
        /// Table the duplicate was inserted into
        table: &'static str,
        /// The duplicated key
        key: String,
    },

    /// The store file already exists and would be overwritten
    #[error("Store already exists: {0}")]
    AlreadyExists(String),

    /// No store file exists at the path to open
    #[error("Store not found: {0}")]
    NotFound(String),

    /// Per-protein values were passed for a dimension keyed by quant channel
    #[error("Dimension {0} is keyed by quant channel")]
    ChannelKeyed(&'static str),
}

impl StoreError {
    pub(crate) fn integrity(table: &'static str, key: impl Into<String>) -> Self {
        StoreError::Integrity {
            table,
            key: key.into(),
        }
    }

    /// Translate a constraint failure on one row into a keyed error.
    ///
    /// Foreign key failures become `Integrity`, unique/primary key failures
    /// become `Duplicate`. Anything else is passed through unchanged.
    pub(crate) fn from_row(err: rusqlite::Error, table: &'static str, key: &str) -> Self {
        if let rusqlite::Error::SqliteFailure(ffi, _) = &err {
            match ffi.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return StoreError::integrity(table, key);
                }
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return StoreError::Duplicate {
                        table,
                        key: key.to_string(),
                    };
                }
                _ => {}
            }
        }
        StoreError::SqliteError(err)
    }
}
