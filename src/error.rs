use crate::input::InputError;
use crate::report::ReportError;
use crate::store::StoreError;

/// Errors that abort a pipeline stage
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Evidence store error, including integrity violations
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// Error reading an input table
    #[error("Input error: {0}")]
    InputError(#[from] InputError),

    /// Error assembling or writing output
    #[error("Output error: {0}")]
    ReportError(#[from] ReportError),

    /// TSV error while copying an input table to the output
    #[error("TSV error: {0}")]
    CsvError(#[from] csv::Error),
}
