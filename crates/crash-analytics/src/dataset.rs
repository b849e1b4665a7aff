//! Immutable, named tabular datasets.
//!
//! A [`Dataset`] is an ordered collection of rows sharing a fixed list of
//! column names. Rows and schema are reference counted, so cloning a dataset
//! or keeping a filtered view of it never copies cell values.

use crate::error::{AnalyticsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// A single cell.
///
/// Ingested columns are text; integers only appear in derived and aggregate
/// columns. The derived ordering sorts nulls first, then integers numerically,
/// then text lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Text(Arc<str>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the text of a text cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of the cell. Text cells are parsed after trimming.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Null => None,
        }
    }

    /// Whether a cast of this cell to a 32-bit integer would succeed.
    ///
    /// Text is trimmed and may carry a sign and a decimal fraction, which the
    /// cast truncates. Exponent notation and values outside the `i32` range
    /// do not cast.
    pub fn is_integer(&self) -> bool {
        match self {
            Self::Int(i) => i32::try_from(*i).is_ok(),
            Self::Text(s) => {
                let s = s.trim();
                let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
                let digits = whole.strip_prefix(['+', '-']).unwrap_or(whole);
                !digits.is_empty()
                    && digits.bytes().all(|b| b.is_ascii_digit())
                    && fraction.bytes().all(|b| b.is_ascii_digit())
                    && whole.parse::<i32>().is_ok()
            }
            Self::Null => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(Arc::from(s))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One row of cells, in schema order.
pub type Row = Arc<[Value]>;

/// Immutable named table.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: Arc<str>,
    columns: Arc<[String]>,
    rows: Arc<[Row]>,
}

impl Dataset {
    /// Build a dataset, checking column names are unique and every row
    /// matches the schema width.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self> {
        let name = name.into();

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(AnalyticsError::DuplicateColumn {
                    dataset: name,
                    column: column.clone(),
                });
            }
        }

        if let Some(bad) = rows.iter().find(|row| row.len() != columns.len()) {
            return Err(AnalyticsError::RowWidth {
                dataset: name,
                expected: columns.len(),
                actual: bad.len(),
            });
        }

        let rows = rows.into_iter().map(Row::from).collect::<Vec<_>>();
        Ok(Self::from_parts(name, columns, rows))
    }

    /// Dataset with no columns and no rows.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::from_parts(name.into(), Vec::new(), Vec::new())
    }

    pub(crate) fn from_parts(name: impl Into<Arc<str>>, columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            columns: columns.into(),
            rows: rows.into(),
        }
    }

    /// Same schema and name, different rows.
    pub(crate) fn with_rows(&self, rows: Vec<Row>) -> Self {
        Self {
            name: Arc::clone(&self.name),
            columns: Arc::clone(&self.columns),
            rows: rows.into(),
        }
    }

    /// Same rows and schema under another name.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            columns: Arc::clone(&self.columns),
            rows: Arc::clone(&self.rows),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Position of `column` in the schema.
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| AnalyticsError::ColumnNotFound {
                dataset: self.name.to_string(),
                column: column.to_string(),
            })
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, column: &str) -> Result<Vec<Value>> {
        let index = self.column_index(column)?;
        Ok(self.rows.iter().map(|row| row[index].clone()).collect())
    }

    /// Value of `column` in the first row, if there is one.
    pub fn first_value(&self, column: &str) -> Result<Option<Value>> {
        let index = self.column_index(column)?;
        Ok(self.rows.first().map(|row| row[index].clone()))
    }

    /// Render up to `max_rows` rows as a bordered text table.
    pub fn show(&self, max_rows: usize) -> String {
        let shown = &self.rows[..self.rows.len().min(max_rows)];
        let cells: Vec<Vec<String>> = shown
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(column.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let border = widths.iter().fold(String::from("+"), |mut line, w| {
            line.push_str(&"-".repeat(*w));
            line.push('+');
            line
        });

        let mut out = String::new();
        out.push_str(&border);
        out.push('\n');
        out.push_str(&render_line(self.columns.iter().map(String::as_str), &widths));
        out.push('\n');
        out.push_str(&border);
        out.push('\n');
        for row in &cells {
            out.push_str(&render_line(row.iter().map(String::as_str), &widths));
            out.push('\n');
        }
        out.push_str(&border);
        out.push('\n');
        if self.rows.len() > shown.len() {
            out.push_str(&format!("only showing top {} rows\n", shown.len()));
        }
        out
    }
}

fn render_line<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (value, &width) in values.zip(widths) {
        line.push_str(&format!("{value:<width$}|"));
    }
    line
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.show(20))
    }
}

/// Build a text-only dataset from string literals; `None` cells become null.
#[cfg(test)]
pub(crate) fn text_dataset(name: &str, columns: &[&str], rows: &[&[Option<&str>]]) -> Dataset {
    Dataset::new(
        name,
        columns.iter().map(ToString::to_string).collect(),
        rows.iter()
            .map(|row| row.iter().map(|cell| Value::from(*cell)).collect())
            .collect(),
    )
    .unwrap()
}
