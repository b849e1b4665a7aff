//! Runner error types

use crash_analytics::AnalyticsError;
use crash_domain::DomainError;
use crash_storage::StorageError;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Domain(#[from] DomainError),
}

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Ingestion failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Loader task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
