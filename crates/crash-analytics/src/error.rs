//! Analytics error types.

use crash_domain::AnalysisId;
use thiserror::Error;

/// Analytics errors.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Column lookup failed
    #[error("Column '{column}' not found in dataset '{dataset}'")]
    ColumnNotFound { dataset: String, column: String },

    /// Column name used twice in one schema
    #[error("Duplicate column '{column}' in dataset '{dataset}'")]
    DuplicateColumn { dataset: String, column: String },

    /// Row does not match the schema width
    #[error("Row width {actual} does not match {expected} columns of dataset '{dataset}'")]
    RowWidth {
        dataset: String,
        expected: usize,
        actual: usize,
    },

    /// An analysis needed at least one row to select from
    #[error("Analysis {0} found no rows to select a result from")]
    EmptyResult(AnalysisId),

    /// No output destination configured
    #[error("No output destination configured for analysis {0}")]
    MissingDestination(AnalysisId),

    /// Result sink failure
    #[error("Result sink failed writing {destination}: {message}")]
    SinkWrite { destination: String, message: String },

    /// Data conversion error
    #[error("Data conversion error: {0}")]
    Conversion(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;
