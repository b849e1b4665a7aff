//! Result sink interface.

use crate::dataset::Dataset;
use crate::error::Result;
use crash_domain::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Where and how one analysis result is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTarget {
    pub path: PathBuf,
    pub format: OutputFormat,
}

impl OutputTarget {
    pub fn new(path: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Output file path; the format's extension is added when the configured
    /// path has none.
    pub fn file_path(&self) -> PathBuf {
        if self.path.extension().is_some() {
            self.path.clone()
        } else {
            self.path.with_extension(self.format.extension())
        }
    }
}

/// Persists result datasets. A failed write is reported to the caller and
/// never retried.
pub trait ResultSink: Send + Sync {
    /// Write `dataset` to `target`.
    fn write(&self, dataset: &Dataset, target: &OutputTarget) -> Result<()>;
}

impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    fn write(&self, dataset: &Dataset, target: &OutputTarget) -> Result<()> {
        (**self).write(dataset, target)
    }
}

impl<S: ResultSink + ?Sized> ResultSink for &S {
    fn write(&self, dataset: &Dataset, target: &OutputTarget) -> Result<()> {
        (**self).write(dataset, target)
    }
}

/// Keeps written datasets in memory. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    writes: Mutex<Vec<(OutputTarget, Dataset)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, in write order.
    pub fn written(&self) -> Vec<(OutputTarget, Dataset)> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultSink for MemorySink {
    fn write(&self, dataset: &Dataset, target: &OutputTarget) -> Result<()> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((target.clone(), dataset.clone()));
        Ok(())
    }
}
