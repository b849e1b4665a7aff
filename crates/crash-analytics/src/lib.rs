//! # Crash Analytics
//!
//! In-memory relational engine answering eight questions about vehicle
//! crash records.
//!
//! ## Features
//!
//! - Immutable, reference-counted datasets
//! - Predicate expressions with three-valued null semantics
//! - Filter, join, grouping, ordering, ranking and set operators
//! - The eight crash analyses over an explicit [`CrashContext`]
//! - Pluggable result sinks and run reports

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod analyses;
pub mod context;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod expr;
pub mod operators;
pub mod reports;
pub mod sink;

pub use analyses::{AnalysisOptions, AnalysisOutput, DamageScaleComparison, Summary};
pub use context::CrashContext;
pub use dataset::{Dataset, Row, Value};
pub use engine::{AnalysisRun, AnalyticsEngine};
pub use error::{AnalyticsError, Result};
pub use expr::{col, Expr, Predicate};
pub use operators::{Aggregate, Derive, JoinKind, Order, RankWindow, Ranking};
pub use reports::RunReport;
pub use sink::{MemorySink, OutputTarget, ResultSink};
