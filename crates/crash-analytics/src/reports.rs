//! Run report generation.

use crate::analyses::Summary;
use crate::context::CrashContext;
use crate::engine::AnalysisRun;
use crate::error::{AnalyticsError, Result};
use crash_domain::{AnalysisId, DatasetKind};
use serde::{Deserialize, Serialize};

/// Row count of one loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub dataset: DatasetKind,
    pub rows: usize,
}

/// Outcome of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis: AnalysisId,
    pub question: String,
    pub summary: Option<Summary>,
    pub rows: Option<usize>,
    pub duration_ms: u64,
    pub error: Option<String>,
}

impl From<&AnalysisRun> for AnalysisReport {
    fn from(run: &AnalysisRun) -> Self {
        let (summary, rows, error) = match &run.outcome {
            Ok(output) => (Some(output.summary.clone()), Some(output.dataset.len()), None),
            Err(e) => (None, None, Some(e.to_string())),
        };
        Self {
            analysis: run.id,
            question: run.id.question().to_string(),
            summary,
            rows,
            duration_ms: u64::try_from(run.elapsed.as_millis()).unwrap_or(u64::MAX),
            error,
        }
    }
}

/// Summary of a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: String,
    pub datasets: Vec<DatasetStats>,
    pub analyses: Vec<AnalysisReport>,
}

impl RunReport {
    /// Build a report from the loaded context and the analysis runs.
    pub fn new(context: &CrashContext, runs: &[AnalysisRun]) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            datasets: context
                .row_counts()
                .into_iter()
                .map(|(dataset, rows)| DatasetStats { dataset, rows })
                .collect(),
            analyses: runs.iter().map(AnalysisReport::from).collect(),
        }
    }

    pub fn failures(&self) -> usize {
        self.analyses.iter().filter(|a| a.error.is_some()).count()
    }

    /// Report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AnalyticsError::Conversion(e.to_string()))
    }

    /// Report as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("# Vehicle Crash Analysis Report\n\n");
        md.push_str(&format!("**Generated:** {}\n\n", self.generated_at));

        if !self.datasets.is_empty() {
            md.push_str("## Datasets\n\n");
            md.push_str("| Dataset | Rows |\n");
            md.push_str("|---------|------|\n");
            for stats in &self.datasets {
                md.push_str(&format!("| {} | {} |\n", stats.dataset, stats.rows));
            }
            md.push('\n');
        }

        if !self.analyses.is_empty() {
            md.push_str("## Analyses\n\n");
            md.push_str("| # | Question | Result | Rows | Duration |\n");
            md.push_str("|---|----------|--------|------|----------|\n");
            for report in &self.analyses {
                let result = match (&report.summary, &report.error) {
                    (_, Some(error)) => format!("**failed:** {error}"),
                    (Some(summary), None) => summary.to_string(),
                    (None, None) => "N/A".to_string(),
                };
                let rows = report
                    .rows
                    .map_or_else(|| "-".to_string(), |r| r.to_string());
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} ms |\n",
                    report.analysis,
                    report.question,
                    escape_cell(&result),
                    rows,
                    report.duration_ms
                ));
            }
            md.push('\n');
        }

        md.push_str("---\n");
        md.push_str(&format!(
            "*{} of {} analyses failed*\n",
            self.failures(),
            self.analyses.len()
        ));
        md
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
