//! CLI entry point for the chatlog puller.

use std::process::ExitCode;

use anyhow::{Context, Result};
use chatlog_core::{DateRange, Pipeline, PipelineConfig, PipelineError};
use clap::Parser;
use tracing::{debug, error, info};

mod cli;
mod exit_handler;

use cli::Args;

/// Process outcome, mapped onto the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Every day was written or already cached.
    Success,
    /// Some days were skipped, others succeeded.
    Partial,
    /// Every attempted day was skipped.
    Failure,
    /// The run was aborted (bad input, configuration, or output write).
    Fatal,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Partial => ExitCode::from(1),
            ProcessExit::Failure => ExitCode::from(2),
            ProcessExit::Fatal => ExitCode::from(3),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    match run(&args).await {
        Ok(exit) => exit.into(),
        Err(err) => {
            error!(error = %err, "run aborted");
            eprintln!("Error: {err:?}");
            ProcessExit::Fatal.into()
        }
    }
}

/// Validates inputs that must be sound before any request is made.
fn prepare(args: &Args) -> Result<(DateRange, PipelineConfig), PipelineError> {
    let range = DateRange::parse(&args.from, &args.to)?;
    let config = PipelineConfig::from_env(args.overrides())?;
    Ok((range, config))
}

async fn run(args: &Args) -> Result<ProcessExit> {
    let (range, config) = prepare(args)?;

    info!(
        from = %range.from(),
        to = %range.to(),
        days = range.len(),
        output_dir = %config.output_dir.display(),
        "Chatlog puller starting"
    );

    let pipeline = Pipeline::from_config(&config)?;
    let stats = pipeline
        .run(range)
        .await
        .context("run aborted, output may be incomplete")?;

    let exit =
        exit_handler::determine_exit_outcome(stats.written() + stats.cached(), stats.skipped());
    info!(
        written = stats.written(),
        cached = stats.cached(),
        skipped = stats.skipped(),
        lines = stats.lines(),
        ?exit,
        "Pull complete"
    );

    Ok(exit)
}
