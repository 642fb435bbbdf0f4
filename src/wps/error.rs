//! Error types for talking to a WPS server.
//!
//! [`WpsError`] separates the failures a poller may retry (transport problems
//! and unusable status documents) from caller mistakes such as asking for a
//! status check without a source.

use thiserror::Error;

/// Errors that can occur while submitting a process or reading its status.
#[derive(Debug, Error)]
pub enum WpsError {
    /// Neither a status-location URL nor a status document was supplied.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Underlying network failure (DNS, connection refused, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status code.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The payload could not be interpreted as a WPS status document.
    #[error("status check failed: {0}")]
    StatusCheckFailed(String),

    /// An accepted execution came back without a `statusLocation` to poll.
    #[error("execute response carries no statusLocation")]
    MissingStatusLocation,
}

impl WpsError {
    /// Whether a poller should count this failure and try again.
    ///
    /// Transport and document failures say nothing about the remote job, so
    /// they are transient. Invalid arguments and a missing status location
    /// would fail identically on every attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            WpsError::Transport(_) | WpsError::HttpStatus { .. } | WpsError::StatusCheckFailed(_)
        )
    }
}
