//! CSV ingestion.

use crate::error::{Result, StorageError};
use crate::sql_literal;
use crash_analytics::{Dataset, Value};
use crash_domain::{sentinel, DatasetKind};
use duckdb::Connection;
use std::path::Path;
use tracing::{debug, info, warn};

/// Read a headered CSV file into a dataset named `name`.
///
/// Every column is read as text. Empty fields become nulls; all other
/// values, sentinels included, are kept verbatim.
pub fn load_csv(name: &str, path: &Path) -> Result<Dataset> {
    if !path.is_file() {
        return Err(StorageError::MissingInput {
            dataset: name.to_string(),
            path: path.display().to_string(),
        });
    }

    let conn = Connection::open_in_memory()?;
    let source = format!(
        "read_csv({}, header = true, all_varchar = true)",
        sql_literal(&path.to_string_lossy())
    );

    let mut stmt = conn.prepare(&format!("DESCRIBE SELECT * FROM {source}"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let width = columns.len();
    let mut stmt = conn.prepare(&format!("SELECT * FROM {source}"))?;
    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|i| row.get::<_, Option<String>>(i).map(Value::from))
                .collect::<std::result::Result<Vec<_>, _>>()
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    debug!(dataset = name, path = %path.display(), columns = width, "Scanned CSV");
    Ok(Dataset::new(name, columns, rows)?)
}

/// Load one of the six input datasets and check it has every column the
/// analyses read.
pub fn load_dataset(kind: DatasetKind, path: &Path) -> Result<Dataset> {
    let dataset = load_csv(kind.as_str(), path)?;

    for &column in kind.required_columns() {
        if !dataset.has_column(column) {
            return Err(StorageError::MissingColumn {
                dataset: kind.to_string(),
                column: column.to_string(),
            });
        }
        if !dataset.is_empty() && carries_no_data(&dataset, column)? {
            warn!(
                dataset = %kind,
                column,
                "Column holds only nulls and sentinel values"
            );
        }
    }

    info!(dataset = %kind, rows = dataset.len(), path = %path.display(), "Dataset loaded");
    Ok(dataset)
}

fn carries_no_data(dataset: &Dataset, column: &str) -> Result<bool> {
    Ok(dataset
        .column_values(column)?
        .iter()
        .all(|v| v.as_str().is_none_or(sentinel::is_sentinel)))
}
