//! Analytics engine driving the analyses and forwarding results to a sink.

use crate::analyses::{self, AnalysisOptions, AnalysisOutput};
use crate::context::CrashContext;
use crate::error::{AnalyticsError, Result};
use crate::sink::{OutputTarget, ResultSink};
use crash_domain::AnalysisId;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Runs analyses against one loaded [`CrashContext`].
pub struct AnalyticsEngine<S> {
    context: CrashContext,
    sink: S,
    targets: BTreeMap<AnalysisId, OutputTarget>,
    options: AnalysisOptions,
}

/// Outcome of one analysis within a batch run.
#[derive(Debug)]
pub struct AnalysisRun {
    pub id: AnalysisId,
    pub elapsed: Duration,
    pub outcome: Result<AnalysisOutput>,
}

impl<S: ResultSink> AnalyticsEngine<S> {
    /// Create an engine with no output targets and default options.
    pub fn new(context: CrashContext, sink: S) -> Self {
        Self {
            context,
            sink,
            targets: BTreeMap::new(),
            options: AnalysisOptions::default(),
        }
    }

    #[must_use]
    pub fn with_targets(mut self, targets: BTreeMap<AnalysisId, OutputTarget>) -> Self {
        self.targets = targets;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    pub fn context(&self) -> &CrashContext {
        &self.context
    }

    /// Compute an analysis without writing its result.
    pub fn evaluate(&self, id: AnalysisId) -> Result<AnalysisOutput> {
        analyses::evaluate(id, &self.context, &self.options)
    }

    /// Compute an analysis and write its result dataset to the configured
    /// target. Nothing is computed when the analysis has no target.
    pub fn run(&self, id: AnalysisId) -> Result<AnalysisOutput> {
        let target = self
            .targets
            .get(&id)
            .ok_or(AnalyticsError::MissingDestination(id))?;

        let output = self.evaluate(id)?;
        self.sink.write(&output.dataset, target)?;

        info!(
            analysis = id.number(),
            rows = output.dataset.len(),
            destination = %target.file_path().display(),
            "Analysis complete"
        );
        Ok(output)
    }

    /// Run each analysis in order. A failure is recorded for that analysis
    /// and the remaining analyses still run.
    pub fn run_all(&self, ids: &[AnalysisId]) -> Vec<AnalysisRun> {
        ids.iter()
            .map(|&id| {
                let started = Instant::now();
                let outcome = self.run(id);
                let elapsed = started.elapsed();
                if let Err(e) = &outcome {
                    warn!(analysis = id.number(), error = %e, "Analysis failed");
                }
                AnalysisRun { id, elapsed, outcome }
            })
            .collect()
    }
}
