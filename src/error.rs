use std::path::PathBuf;

use thiserror::Error;

use crate::wps::WpsError;

/// Failures that end a run before the remote job reaches a verdict.
///
/// A job that itself fails is not represented here; see
/// [`ExitSignal::Failure`](crate::poll::ExitSignal::Failure).
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Could not read workflow {}: {source}", path.display())]
    WorkflowIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Workflow {} is not valid JSON: {source}", path.display())]
    WorkflowJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Could not submit workflow: {0}")]
    Submit(#[source] WpsError),

    #[error("Status check failed: {0}")]
    Status(#[source] WpsError),

    #[error("Could not read status document after {attempts} retries. Giving up. Last error: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
