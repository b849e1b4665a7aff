//! CSV and Parquet result sink.

use crate::error::{Result, StorageError};
use crate::{sql_identifier, sql_literal};
use crash_analytics::{AnalyticsError, Dataset, OutputTarget, ResultSink, Value};
use crash_domain::OutputFormat;
use duckdb::{params_from_iter, types, Connection};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Writes result datasets through an embedded DuckDB connection.
///
/// Each write replaces whatever file is at the target path. Integer-only
/// columns are stored as `BIGINT`, everything else as `VARCHAR`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDbSink;

impl DuckDbSink {
    pub fn new() -> Self {
        Self
    }

    fn write_file(dataset: &Dataset, path: &Path, format: OutputFormat) -> Result<()> {
        if dataset.width() == 0 {
            return Err(StorageError::NoColumns(dataset.name().to_string()));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        if path.is_file() {
            fs::remove_file(path)?;
        }

        let conn = Connection::open_in_memory()?;
        let kinds = column_types(dataset);
        let definitions = dataset
            .columns()
            .iter()
            .zip(&kinds)
            .map(|(name, ty)| format!("{} {}", sql_identifier(name), ty.sql()))
            .collect::<Vec<_>>()
            .join(", ");
        conn.execute_batch(&format!("CREATE TABLE result ({definitions})"))?;

        let placeholders = vec!["?"; dataset.width()].join(", ");
        let mut insert = conn.prepare(&format!("INSERT INTO result VALUES ({placeholders})"))?;
        for row in dataset.rows() {
            insert.execute(params_from_iter(
                row.iter().zip(&kinds).map(|(value, ty)| ty.convert(value)),
            ))?;
        }

        let options = match format {
            OutputFormat::Csv => "FORMAT CSV, HEADER",
            OutputFormat::Parquet => "FORMAT PARQUET",
        };
        conn.execute_batch(&format!(
            "COPY result TO {} ({options})",
            sql_literal(&path.to_string_lossy())
        ))?;

        debug!(
            dataset = %dataset.name(),
            rows = dataset.len(),
            path = %path.display(),
            format = %format,
            "Result written"
        );
        Ok(())
    }
}

impl ResultSink for DuckDbSink {
    fn write(&self, dataset: &Dataset, target: &OutputTarget) -> crash_analytics::Result<()> {
        let path = target.file_path();
        Self::write_file(dataset, &path, target.format).map_err(|e| AnalyticsError::SinkWrite {
            destination: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnType {
    BigInt,
    Varchar,
}

impl ColumnType {
    fn sql(self) -> &'static str {
        match self {
            Self::BigInt => "BIGINT",
            Self::Varchar => "VARCHAR",
        }
    }

    fn convert(self, value: &Value) -> types::Value {
        match (self, value) {
            (_, Value::Null) => types::Value::Null,
            (Self::BigInt, Value::Int(i)) => types::Value::BigInt(*i),
            (_, other) => types::Value::Text(other.to_string()),
        }
    }
}

fn column_types(dataset: &Dataset) -> Vec<ColumnType> {
    (0..dataset.width())
        .map(|i| {
            let mut cells = dataset.rows().iter().map(|row| &row[i]).filter(|v| !v.is_null());
            let mut any = false;
            let all_int = cells.all(|v| {
                any = true;
                matches!(v, Value::Int(_))
            });
            if any && all_int {
                ColumnType::BigInt
            } else {
                ColumnType::Varchar
            }
        })
        .collect()
}
