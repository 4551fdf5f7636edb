use crate::store::StoreError;

/// Errors that can occur while assembling or writing a report
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Error reading the evidence store
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// SQLite error while iterating the report query
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// Error writing the TSV output
    #[error("TSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// I/O error on the output file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
