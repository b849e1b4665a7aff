//! Storage layer error types

use crash_analytics::AnalyticsError;
use thiserror::Error;

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Input file for dataset '{dataset}' not found: {path}")]
    MissingInput { dataset: String, path: String },

    #[error("No input file configured for dataset '{0}'")]
    UnconfiguredInput(String),

    #[error("Dataset '{dataset}' is missing required column '{column}'")]
    MissingColumn { dataset: String, column: String },

    #[error("Cannot write a dataset without columns: '{0}'")]
    NoColumns(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}

pub type Result<T> = std::result::Result<T, StorageError>;
