//! Relational operators over [`Dataset`].
//!
//! Every operator is pure: it reads its inputs and returns a new dataset.
//! Ordering is deterministic. Grouping emits groups in ascending key order and
//! sorting is stable, so rows that tie on the sort column keep ascending
//! group-key order.

use crate::dataset::{Dataset, Row, Value};
use crate::error::{AnalyticsError, Result};
use crate::expr::Expr;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Column produced by [`Aggregate::Count`].
pub const COUNT_COLUMN: &str = "count";

/// Helper column used by [`Dataset::rank_window`].
pub const RANK_COLUMN: &str = "rank";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    /// Keep unmatched left rows, padding the right side with nulls.
    Left,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregate {
    /// Rows per group, in [`COUNT_COLUMN`].
    Count,
    /// Integer sum of `column` per group, in `alias`. Nulls and non-integer
    /// cells are skipped; a group with nothing to add sums to null.
    Sum { column: String, alias: String },
}

impl Aggregate {
    pub fn sum(column: &str, alias: &str) -> Self {
        Self::Sum {
            column: column.to_string(),
            alias: alias.to_string(),
        }
    }

    fn output_column(&self) -> &str {
        match self {
            Self::Count => COUNT_COLUMN,
            Self::Sum { alias, .. } => alias,
        }
    }
}

/// How equal sort values are ranked within a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    /// 1, 2, 3, ... regardless of ties; ties keep input order.
    RowNumber,
    /// Equal values share a rank, with no gaps after a tie.
    Dense,
}

/// Derived column definitions for [`Dataset::with_column`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derive {
    /// Integer sum of the listed columns; null if any of them is null or
    /// not an integer.
    Sum(Vec<String>),
}

/// Inclusive rank range selected by [`Dataset::rank_window`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankWindow {
    pub ranking: Ranking,
    pub first: i64,
    pub last: i64,
}

impl RankWindow {
    /// Row positions `first..=last`, counted from 1.
    pub const fn positions(first: i64, last: i64) -> Self {
        Self {
            ranking: Ranking::RowNumber,
            first,
            last,
        }
    }

    /// Dense ranks `first..=last`.
    pub const fn dense(first: i64, last: i64) -> Self {
        Self {
            ranking: Ranking::Dense,
            first,
            last,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.first < 1 || self.first > self.last {
            return Err(AnalyticsError::InvalidParameter(format!(
                "rank window {}..={} must start at 1 or later and not be empty",
                self.first, self.last
            )));
        }
        Ok(())
    }

    fn contains(&self, rank: i64) -> bool {
        (self.first..=self.last).contains(&rank)
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    count: i64,
    sum: Option<i64>,
}

impl Dataset {
    fn column_indices(&self, columns: &[&str]) -> Result<Vec<usize>> {
        columns.iter().map(|c| self.column_index(c)).collect()
    }

    /// Rows for which `predicate` is definitely true.
    pub fn filter(&self, predicate: &Expr) -> Result<Self> {
        let bound = predicate.bind(self)?;
        let rows: Vec<Row> = self
            .rows()
            .iter()
            .filter(|row| bound.keeps(row))
            .cloned()
            .collect();

        debug!(dataset = %self.name(), kept = rows.len(), input = self.len(), "filter");
        Ok(self.with_rows(rows))
    }

    /// Combine rows with equal `key` values.
    ///
    /// Output columns are the key, the remaining left columns, then the
    /// remaining right columns. A right column whose name is already taken is
    /// renamed `<right dataset>.<column>`. Duplicate keys fan out into their
    /// cross product; null keys never match.
    pub fn join(&self, right: &Self, key: &str, kind: JoinKind) -> Result<Self> {
        let left_key = self.column_index(key)?;
        let right_key = right.column_index(key)?;

        let mut columns = Vec::with_capacity(self.width() + right.width());
        columns.push(key.to_string());
        columns.extend(
            self.columns()
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != left_key)
                .map(|(_, c)| c.clone()),
        );
        let mut taken: HashSet<String> = columns.iter().cloned().collect();
        for (i, column) in right.columns().iter().enumerate() {
            if i == right_key {
                continue;
            }
            let mut name = column.clone();
            if taken.contains(&name) {
                name = format!("{}.{}", right.name(), column);
            }
            taken.insert(name.clone());
            columns.push(name);
        }

        let mut index: HashMap<&Value, Vec<&Row>> = HashMap::new();
        for row in right.rows() {
            let k = &row[right_key];
            if !k.is_null() {
                index.entry(k).or_default().push(row);
            }
        }

        let width = columns.len();
        let right_pad = right.width().saturating_sub(1);
        let mut rows = Vec::new();
        for left in self.rows() {
            let k = &left[left_key];
            let matches = if k.is_null() { None } else { index.get(k) };
            match matches {
                Some(partners) => {
                    for partner in partners {
                        let mut values = Vec::with_capacity(width);
                        values.push(k.clone());
                        push_except(&mut values, left, left_key);
                        push_except(&mut values, partner, right_key);
                        rows.push(Row::from(values));
                    }
                }
                None if kind == JoinKind::Left => {
                    let mut values = Vec::with_capacity(width);
                    values.push(k.clone());
                    push_except(&mut values, left, left_key);
                    values.extend(std::iter::repeat_n(Value::Null, right_pad));
                    rows.push(Row::from(values));
                }
                None => {}
            }
        }

        debug!(
            left = %self.name(),
            right = %right.name(),
            rows = rows.len(),
            "join"
        );
        Ok(Self::from_parts(
            format!("{}+{}", self.name(), right.name()),
            columns,
            rows,
        ))
    }

    /// One row per distinct combination of `keys`, with the aggregate
    /// appended. Nulls form their own group.
    pub fn group_by(&self, keys: &[&str], aggregate: &Aggregate) -> Result<Self> {
        let key_indices = self.column_indices(keys)?;
        let sum_index = match aggregate {
            Aggregate::Count => None,
            Aggregate::Sum { column, .. } => Some(self.column_index(column)?),
        };

        let mut groups: BTreeMap<Vec<Value>, Accumulator> = BTreeMap::new();
        for row in self.rows() {
            let key = key_indices.iter().map(|&i| row[i].clone()).collect();
            let acc = groups.entry(key).or_default();
            acc.count += 1;
            if let Some(v) = sum_index.and_then(|i| row[i].as_int()) {
                let sum = acc.sum.unwrap_or(0).checked_add(v).ok_or_else(|| {
                    overflow(self.name(), aggregate.output_column())
                })?;
                acc.sum = Some(sum);
            }
        }

        let mut columns: Vec<String> = keys.iter().map(ToString::to_string).collect();
        columns.push(aggregate.output_column().to_string());

        let rows: Vec<Row> = groups
            .into_iter()
            .map(|(mut key, acc)| {
                key.push(match aggregate {
                    Aggregate::Count => Value::Int(acc.count),
                    Aggregate::Sum { .. } => acc.sum.into(),
                });
                Row::from(key)
            })
            .collect();

        debug!(dataset = %self.name(), groups = rows.len(), "group_by");
        Ok(Self::from_parts(self.name(), columns, rows))
    }

    /// Append a derived column.
    pub fn with_column(&self, name: &str, derive: &Derive) -> Result<Self> {
        if self.has_column(name) {
            return Err(AnalyticsError::DuplicateColumn {
                dataset: self.name().to_string(),
                column: name.to_string(),
            });
        }

        let Derive::Sum(inputs) = derive;
        let inputs: Vec<&str> = inputs.iter().map(String::as_str).collect();
        let indices = self.column_indices(&inputs)?;

        let rows = self
            .rows()
            .iter()
            .map(|row| -> Result<Row> {
                let mut total = Some(0_i64);
                for &i in &indices {
                    total = match (total, row[i].as_int()) {
                        (Some(acc), Some(v)) => {
                            Some(acc.checked_add(v).ok_or_else(|| overflow(self.name(), name))?)
                        }
                        _ => None,
                    };
                }
                Ok(extend_row(row, total.into()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut columns = self.columns().to_vec();
        columns.push(name.to_string());
        Ok(Self::from_parts(self.name(), columns, rows))
    }

    /// Stable sort by one column. Nulls sort first ascending and last
    /// descending.
    pub fn order_by(&self, column: &str, order: Order) -> Result<Self> {
        let index = self.column_index(column)?;
        let mut rows = self.rows().to_vec();
        match order {
            Order::Ascending => rows.sort_by(|a, b| a[index].cmp(&b[index])),
            Order::Descending => rows.sort_by(|a, b| b[index].cmp(&a[index])),
        }
        Ok(self.with_rows(rows))
    }

    /// First `k` rows in current order.
    #[must_use]
    pub fn limit(&self, k: usize) -> Self {
        self.with_rows(self.rows().iter().take(k).cloned().collect())
    }

    /// First `k` rows after ordering by `column`.
    pub fn top_k(&self, k: usize, column: &str, order: Order) -> Result<Self> {
        Ok(self.order_by(column, order)?.limit(k))
    }

    /// Append a rank column computed within each partition of
    /// `partition_by`, ordered by `order_column`. Output is grouped by
    /// partition in ascending key order, each partition in rank order.
    pub fn partitioned_rank(
        &self,
        partition_by: &[&str],
        order_column: &str,
        order: Order,
        ranking: Ranking,
        rank_column: &str,
    ) -> Result<Self> {
        if self.has_column(rank_column) {
            return Err(AnalyticsError::DuplicateColumn {
                dataset: self.name().to_string(),
                column: rank_column.to_string(),
            });
        }
        let partition_indices = self.column_indices(partition_by)?;
        let order_index = self.column_index(order_column)?;

        let mut partitions: BTreeMap<Vec<Value>, Vec<Row>> = BTreeMap::new();
        for row in self.rows() {
            let key = partition_indices.iter().map(|&i| row[i].clone()).collect();
            partitions.entry(key).or_default().push(Arc::clone(row));
        }

        let mut rows = Vec::with_capacity(self.len());
        for members in partitions.into_values() {
            let members = self.with_rows(members).order_by(order_column, order)?;
            let mut rank = 0_i64;
            let mut previous: Option<&Value> = None;
            for (position, row) in members.rows().iter().enumerate() {
                let current = &row[order_index];
                rank = match ranking {
                    Ranking::RowNumber => i64::try_from(position + 1).unwrap_or(i64::MAX),
                    Ranking::Dense if previous == Some(current) => rank,
                    Ranking::Dense => rank + 1,
                };
                previous = Some(current);
                rows.push(extend_row(row, Value::Int(rank)));
            }
        }

        let mut columns = self.columns().to_vec();
        columns.push(rank_column.to_string());
        Ok(Self::from_parts(self.name(), columns, rows))
    }

    /// Rows whose global rank by `order_column` falls inside `window`.
    pub fn rank_window(&self, order_column: &str, order: Order, window: &RankWindow) -> Result<Self> {
        window.validate()?;
        let ranked = self.partitioned_rank(&[], order_column, order, window.ranking, RANK_COLUMN)?;
        let rank_index = ranked.width() - 1;

        let rows = ranked
            .rows()
            .iter()
            .filter(|row| row[rank_index].as_int().is_some_and(|r| window.contains(r)))
            .map(|row| Row::from(&row[..rank_index]))
            .collect();

        debug!(
            dataset = %self.name(),
            first = window.first,
            last = window.last,
            "rank_window"
        );
        Ok(self.with_rows(rows))
    }

    /// Distinct rows of `self` that do not appear in `other`.
    pub fn except(&self, other: &Self) -> Result<Self> {
        if self.width() != other.width() {
            return Err(AnalyticsError::InvalidParameter(format!(
                "cannot subtract '{}' ({} columns) from '{}' ({} columns)",
                other.name(),
                other.width(),
                self.name(),
                self.width()
            )));
        }

        let excluded: HashSet<&[Value]> = other.rows().iter().map(|row| &row[..]).collect();
        let mut seen: HashSet<&[Value]> = HashSet::new();
        let mut rows = Vec::new();
        for row in self.rows() {
            let cells: &[Value] = row;
            if !excluded.contains(cells) && seen.insert(cells) {
                rows.push(Arc::clone(row));
            }
        }
        Ok(self.with_rows(rows))
    }

    /// Keep only `columns`, in the given order.
    pub fn select(&self, columns: &[&str]) -> Result<Self> {
        let indices = self.column_indices(columns)?;
        let rows = self
            .rows()
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect::<Row>())
            .collect();
        Ok(Self::from_parts(
            self.name(),
            columns.iter().map(ToString::to_string).collect(),
            rows,
        ))
    }

    /// Remove `columns`.
    pub fn drop_columns(&self, columns: &[&str]) -> Result<Self> {
        let removed = self.column_indices(columns)?;
        let kept: Vec<&str> = self
            .columns()
            .iter()
            .enumerate()
            .filter(|(i, _)| !removed.contains(i))
            .map(|(_, c)| c.as_str())
            .collect();
        self.select(&kept)
    }

    /// First occurrence of each distinct row.
    #[must_use]
    pub fn distinct(&self) -> Self {
        let mut seen: HashSet<&[Value]> = HashSet::new();
        let mut rows = Vec::new();
        for row in self.rows() {
            let cells: &[Value] = row;
            if seen.insert(cells) {
                rows.push(Arc::clone(row));
            }
        }
        self.with_rows(rows)
    }
}

fn push_except(values: &mut Vec<Value>, row: &[Value], skip: usize) {
    values.extend(
        row.iter()
            .enumerate()
            .filter(|(i, _)| *i != skip)
            .map(|(_, v)| v.clone()),
    );
}

fn overflow(dataset: &str, column: &str) -> AnalyticsError {
    AnalyticsError::Conversion(format!(
        "integer overflow computing '{column}' in dataset '{dataset}'"
    ))
}

fn extend_row(row: &[Value], value: Value) -> Row {
    row.iter().cloned().chain(std::iter::once(value)).collect()
}
