//! # Crash Analysis Runner
//!
//! Library side of the `crash-analysis` binary: run configuration, parallel
//! dataset loading, the sequential analysis run and report output.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::RunConfig;
pub use error::{ConfigError, RunError};

/// Runner version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
