//! Composable row predicates.
//!
//! Predicates use three-valued logic: a comparison against a null cell is
//! unknown (`None`), `NOT` of unknown stays unknown, and a filter keeps a row
//! only when its predicate is definitely true. Null checks and integer-cast
//! checks always yield a definite answer.

use crate::dataset::{Dataset, Value};
use crate::error::Result;
use std::cmp::Ordering;

/// Test applied to a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Value),
    Ne(Value),
    /// Case-sensitive substring match.
    Contains(String),
    In(Vec<Value>),
    Gt(Value),
    IsNull,
    /// True when the cell is null or does not cast to an integer.
    NotInteger,
    /// Numeric level embedded in text such as `"DAMAGED 5"` is above the bound.
    LevelGt(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column { column: String, predicate: Predicate },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    #[must_use]
    pub fn and(self, rhs: Self) -> Self {
        Self::And(Box::new(self), Box::new(rhs))
    }

    #[must_use]
    pub fn or(self, rhs: Self) -> Self {
        Self::Or(Box::new(self), Box::new(rhs))
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Resolve column names against a schema.
    pub(crate) fn bind<'e>(&'e self, dataset: &Dataset) -> Result<BoundExpr<'e>> {
        Ok(match self {
            Self::Column { column, predicate } => BoundExpr::Column {
                index: dataset.column_index(column)?,
                predicate,
            },
            Self::And(lhs, rhs) => {
                BoundExpr::And(Box::new(lhs.bind(dataset)?), Box::new(rhs.bind(dataset)?))
            }
            Self::Or(lhs, rhs) => {
                BoundExpr::Or(Box::new(lhs.bind(dataset)?), Box::new(rhs.bind(dataset)?))
            }
            Self::Not(inner) => BoundExpr::Not(Box::new(inner.bind(dataset)?)),
        })
    }
}

/// Start a predicate on `name`.
#[must_use]
pub fn col(name: &str) -> ColumnBuilder {
    ColumnBuilder {
        name: name.to_string(),
    }
}

pub struct ColumnBuilder {
    name: String,
}

impl ColumnBuilder {
    fn predicate(self, predicate: Predicate) -> Expr {
        Expr::Column {
            column: self.name,
            predicate,
        }
    }

    pub fn eq(self, value: impl Into<Value>) -> Expr {
        self.predicate(Predicate::Eq(value.into()))
    }

    pub fn ne(self, value: impl Into<Value>) -> Expr {
        self.predicate(Predicate::Ne(value.into()))
    }

    #[must_use]
    pub fn contains(self, needle: &str) -> Expr {
        self.predicate(Predicate::Contains(needle.to_string()))
    }

    pub fn is_in<I, V>(self, values: I) -> Expr
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.predicate(Predicate::In(values.into_iter().map(Into::into).collect()))
    }

    pub fn gt(self, value: impl Into<Value>) -> Expr {
        self.predicate(Predicate::Gt(value.into()))
    }

    #[must_use]
    pub fn is_null(self) -> Expr {
        self.predicate(Predicate::IsNull)
    }

    #[must_use]
    pub fn not_integer(self) -> Expr {
        self.predicate(Predicate::NotInteger)
    }

    #[must_use]
    pub fn level_gt(self, bound: i64) -> Expr {
        self.predicate(Predicate::LevelGt(bound))
    }
}

impl Predicate {
    /// Evaluate against one cell.
    pub fn test(&self, value: &Value) -> Option<bool> {
        match self {
            Self::IsNull => return Some(value.is_null()),
            Self::NotInteger => return Some(!value.is_integer()),
            _ if value.is_null() => return None,
            _ => {}
        }

        match self {
            Self::Eq(expected) => compare(value, expected).map(Ordering::is_eq),
            Self::Ne(expected) => compare(value, expected).map(Ordering::is_ne),
            Self::Gt(bound) => compare(value, bound).map(Ordering::is_gt),
            Self::Contains(needle) => Some(match value {
                Value::Text(s) => s.contains(needle.as_str()),
                other => other.to_string().contains(needle.as_str()),
            }),
            Self::In(values) => {
                if values.iter().any(|v| compare(value, v) == Some(Ordering::Equal)) {
                    Some(true)
                } else if values.iter().any(Value::is_null) {
                    None
                } else {
                    Some(false)
                }
            }
            Self::LevelGt(bound) => embedded_level(value).map(|level| level > *bound),
            Self::IsNull | Self::NotInteger => unreachable!("handled above"),
        }
    }
}

/// Compare two non-null cells. Text against text is lexicographic; integers
/// compare numerically, also against text that parses as an integer.
fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Text(a), Value::Text(b)) => Some(a.as_ref().cmp(b.as_ref())),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Int(a), text @ Value::Text(_)) => match text.as_int() {
            Some(b) => Some(a.cmp(&b)),
            None => Some(a.to_string().as_str().cmp(&*text.to_string())),
        },
        (text @ Value::Text(_), Value::Int(b)) => match text.as_int() {
            Some(a) => Some(a.cmp(b)),
            None => Some(text.to_string().as_str().cmp(&*b.to_string())),
        },
    }
}

/// First run of ASCII digits in the cell, e.g. `5` for `"DAMAGED 5"`.
fn embedded_level(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Text(s) => {
            let digits: String = s
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse().ok()
        }
        Value::Null => None,
    }
}

/// Expression with column names resolved to positions.
pub(crate) enum BoundExpr<'e> {
    Column {
        index: usize,
        predicate: &'e Predicate,
    },
    And(Box<BoundExpr<'e>>, Box<BoundExpr<'e>>),
    Or(Box<BoundExpr<'e>>, Box<BoundExpr<'e>>),
    Not(Box<BoundExpr<'e>>),
}

impl BoundExpr<'_> {
    pub(crate) fn eval(&self, row: &[Value]) -> Option<bool> {
        match self {
            Self::Column { index, predicate } => predicate.test(&row[*index]),
            Self::And(lhs, rhs) => match (lhs.eval(row), rhs.eval(row)) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            Self::Or(lhs, rhs) => match (lhs.eval(row), rhs.eval(row)) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
            Self::Not(inner) => inner.eval(row).map(|b| !b),
        }
    }

    /// Whether a filter keeps this row.
    pub(crate) fn keeps(&self, row: &[Value]) -> bool {
        self.eval(row) == Some(true)
    }
}
