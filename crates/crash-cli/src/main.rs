//! # Vehicle Crash Analysis
//!
//! Binary entry point: loads the six crash datasets named in the run
//! configuration, answers the eight analyses and writes their results.

use anyhow::{bail, Context, Result};
use clap::Parser;
use crash_cli::{pipeline, RunConfig};
use crash_domain::AnalysisId;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "crash-analysis", version)]
#[command(about = "Answer the eight vehicle crash analyses over the crash datasets")]
struct Args {
    /// Run configuration (YAML for .yaml/.yml paths, JSON otherwise)
    #[arg(short, long, env = "CRASH_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Run only this analysis number (repeatable)
    #[arg(long, value_name = "N")]
    only: Vec<AnalysisId>,

    /// Keep results in memory instead of writing output files
    #[arg(long)]
    dry_run: bool,

    /// Write a run report (JSON for a .json path, Markdown otherwise)
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))
    });
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.json_logs);

    tracing::info!(
        version = crash_cli::VERSION,
        config = %args.config.display(),
        "Starting crash analysis"
    );

    let config = RunConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let ids = pipeline::selection(&args.only);

    let mut stdout = std::io::stdout().lock();
    let report = pipeline::run(&config, &ids, args.dry_run, &mut stdout).await?;

    if let Some(path) = &args.report {
        pipeline::write_report(&report, path)?;
    }

    if report.failures() > 0 {
        bail!("{} of {} analyses failed", report.failures(), report.analyses.len());
    }
    Ok(())
}
