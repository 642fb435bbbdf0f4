//! Command-line interface, built on clap.
//!
//! Two positional arguments name the WPS host and the workflow file. The
//! optional flags override values from the configuration file.

use std::path::PathBuf;

use clap::Parser;

use crate::config::RunConfig;
use crate::error::RunError;

/// Submit a workflow to a WPS server and wait for it to finish.
#[derive(Debug, Parser)]
#[command(name = "run_workflow", version, about)]
pub struct Cli {
    /// Host of the WPS server; the endpoint is http://<target>:<port>/wps.
    pub target: String,

    /// Path to the JSON workflow definition.
    pub workflow_filename: PathBuf,

    /// Configuration file (defaults to ./wps-run.toml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Port of the WPS endpoint.
    #[arg(long)]
    pub port: Option<u16>,

    /// Consecutive unreadable status documents tolerated before giving up.
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Pause in milliseconds before retrying a failed status check.
    #[arg(long)]
    pub retry_delay_ms: Option<u64>,

    /// Pause in seconds after each status check of a pending job.
    #[arg(long)]
    pub settle_secs: Option<u64>,

    /// Verify TLS certificates of the WPS server.
    #[arg(long, default_value_t = false)]
    pub verify_tls: bool,

    /// Show a progress bar while the job runs.
    #[arg(long, default_value_t = false)]
    pub progress: bool,

    /// Print a JSON summary of the run at the end.
    #[arg(long, default_value_t = false)]
    pub summary: bool,

    /// Enable debug logging.
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// Load the configuration file and apply flag overrides on top.
    pub fn resolve_config(&self) -> Result<RunConfig, RunError> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load_from(path)?,
            None => RunConfig::load()?,
        };
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut RunConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if let Some(retry_delay_ms) = self.retry_delay_ms {
            config.retry_delay_ms = retry_delay_ms;
        }
        if let Some(settle_secs) = self.settle_secs {
            config.settle_secs = settle_secs;
        }
        if self.verify_tls {
            config.verify_tls = true;
        }
    }
}
