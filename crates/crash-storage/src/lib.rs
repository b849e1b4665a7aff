//! # Crash Storage
//!
//! File-system edge of the crash analytics engine, backed by an embedded
//! DuckDB connection:
//!
//! - [`loader`] scans headered CSV files into in-memory datasets, every
//!   column as text.
//! - [`sink`] persists result datasets as CSV or Parquet.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod error;
pub mod loader;
pub mod sink;

pub use error::{Result, StorageError};
pub use loader::{load_csv, load_dataset};
pub use sink::DuckDbSink;

/// Quote a string literal for embedding in DuckDB SQL.
pub(crate) fn sql_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Quote an identifier for embedding in DuckDB SQL.
pub(crate) fn sql_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
