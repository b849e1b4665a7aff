//! Batch run: load the six datasets, run the selected analyses, report.

use crate::config::RunConfig;
use crate::error::RunError;
use crash_analytics::{
    AnalysisRun, AnalyticsEngine, CrashContext, MemorySink, OutputTarget, ResultSink, RunReport,
    Summary,
};
use crash_domain::{AnalysisId, DatasetKind};
use crash_storage::{load_dataset, DuckDbSink, StorageError};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Rows printed for table results.
pub const SHOW_ROWS: usize = 20;

/// Load all six datasets in parallel on the blocking pool. The first failure
/// aborts the remaining loads.
pub async fn load_context(inputs: &BTreeMap<DatasetKind, PathBuf>) -> Result<CrashContext, RunError> {
    let mut loads = JoinSet::new();
    for kind in DatasetKind::ALL {
        let path = inputs
            .get(&kind)
            .cloned()
            .ok_or_else(|| StorageError::UnconfiguredInput(kind.to_string()))?;
        loads.spawn_blocking(move || load_dataset(kind, &path).map(|ds| (kind, ds)));
    }

    let mut context = CrashContext::new();
    while let Some(joined) = loads.join_next().await {
        match joined? {
            Ok((kind, dataset)) => context = context.with_dataset(kind, dataset),
            Err(e) => {
                loads.abort_all();
                return Err(e.into());
            }
        }
    }

    for (kind, rows) in context.row_counts() {
        info!(dataset = %kind, rows, "Row count");
    }
    Ok(context)
}

/// Analyses to run: the given selection in ascending order without repeats,
/// or all eight when the selection is empty.
pub fn selection(only: &[AnalysisId]) -> Vec<AnalysisId> {
    if only.is_empty() {
        return AnalysisId::ALL.to_vec();
    }
    let mut ids = only.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Configured output targets. A dry run writes nowhere, so analyses without
/// an output path get a placeholder target instead of failing.
pub fn targets(
    config: &RunConfig,
    dry_run: bool,
) -> Result<BTreeMap<AnalysisId, OutputTarget>, RunError> {
    let mut targets = config.targets()?;
    if dry_run {
        let format = config.output_format()?;
        for id in AnalysisId::ALL {
            targets
                .entry(id)
                .or_insert_with(|| OutputTarget::new(format!("dry-run/{id}"), format));
        }
    }
    Ok(targets)
}

/// Console lines for one analysis.
pub fn render_run(run: &AnalysisRun) -> String {
    match &run.outcome {
        Ok(output) if output.summary == Summary::Table => {
            format!("{}. Result:\n{}", run.id, output.dataset.show(SHOW_ROWS))
        }
        Ok(output) => format!("{}. Result: {}", run.id, output.summary),
        Err(e) => format!("{}. Failed: {e}", run.id),
    }
}

/// Load the inputs, run `ids` and print each result to `out`.
///
/// Results go to the configured files, or stay in memory when `dry_run` is
/// set. Failed analyses are listed in the returned report; only ingestion and
/// console errors abort the run.
pub async fn run(
    config: &RunConfig,
    ids: &[AnalysisId],
    dry_run: bool,
    out: &mut impl Write,
) -> Result<RunReport, RunError> {
    let context = load_context(&config.inputs()?).await?;

    let memory = MemorySink::new();
    let sink: Box<dyn ResultSink + '_> = if dry_run {
        info!("Dry run: results are kept in memory");
        Box::new(&memory)
    } else {
        Box::new(DuckDbSink::new())
    };

    let engine = AnalyticsEngine::new(context, sink)
        .with_targets(targets(config, dry_run)?)
        .with_options(config.options);

    let runs = engine.run_all(ids);
    for run in &runs {
        writeln!(out, "{}", render_run(run))?;
    }

    if dry_run {
        let rows: usize = memory.written().iter().map(|(_, dataset)| dataset.len()).sum();
        info!(results = memory.len(), rows, "Dry run results kept in memory");
    }

    let report = RunReport::new(engine.context(), &runs);
    if report.failures() > 0 {
        warn!(failed = report.failures(), total = runs.len(), "Run finished with failures");
    } else {
        info!(total = runs.len(), "Run finished");
    }
    Ok(report)
}

/// Write the run report: JSON for a `.json` path, Markdown otherwise.
pub fn write_report(report: &RunReport, path: &Path) -> Result<(), RunError> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let body = if is_json {
        report.to_json()?
    } else {
        report.to_markdown()
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, body)?;
    info!(path = %path.display(), "Report written");
    Ok(())
}
