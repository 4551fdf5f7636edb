/// Errors that can occur while reading PSM tables, protein tables or FASTA
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// I/O error reading the table
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV/TSV parsing error
    #[error("TSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// A configured column is not in the table header
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A cell could not be parsed
    #[error("Invalid value {value:?} in column {column} at row {row}")]
    InvalidValue {
        /// Zero-based data row number
        row: u64,
        /// Column name
        column: String,
        /// Offending cell content
        value: String,
    },

    /// Sequence data before the first FASTA header
    #[error("Invalid FASTA: sequence line before first header: {0}")]
    InvalidFasta(String),
}
