mod cli;
mod config;
mod error;
mod poll;
mod runner;
mod status;
mod summary;
mod ui;
mod workflow;
mod wps;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use ui::PollProgress;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.resolve_config().context("failed to load configuration")?;
    let endpoint = config.endpoint(&cli.target);

    let mut progress = PollProgress::new(cli.progress);
    let summary =
        runner::run_workflow(&endpoint, &cli.workflow_filename, &config, &mut progress).await?;
    if cli.summary {
        progress.print_summary(&summary);
    }

    let code = runner::exit_code(&summary.outcome)?;
    Ok(ExitCode::from(code))
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "{}={level}",
            env!("CARGO_CRATE_NAME")
        )))
        .with_writer(std::io::stderr)
        .init();
}
