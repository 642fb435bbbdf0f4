//! Data types for WPS executions and their status documents.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The four states a remote execution can be observed in.
///
/// `ProcessPaused` has no state of its own; it is reported as `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Accepted,
    Running,
    Succeeded,
    Failed,
}

impl JobStatus {
    /// `Succeeded` and `Failed` end the execution; nothing changes afterwards.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Accepted => write!(f, "Accepted"),
            JobStatus::Running => write!(f, "Running"),
            JobStatus::Succeeded => write!(f, "Succeeded"),
            JobStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// One `ows:Exception` reported by a failed execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    /// `exceptionCode` attribute, e.g. "NoApplicableCode".
    pub code: Option<String>,
    /// `locator` attribute, usually the failing input or step.
    pub locator: Option<String>,
    /// All `ExceptionText` children joined by newlines.
    pub text: String,
}

/// The value carried by a process output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputValue {
    Reference {
        href: String,
        mime_type: Option<String>,
    },
    Data(String),
}

/// An output listed under `wps:ProcessOutputs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutput {
    pub identifier: String,
    pub value: OutputValue,
}

/// A decoded `wps:ExecuteResponse` (or server `ows:ExceptionReport`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDocument {
    pub status: JobStatus,
    pub percent_completed: Option<u8>,
    pub status_message: Option<String>,
    pub creation_time: Option<String>,
    pub process_identifier: Option<String>,
    /// `statusLocation` attribute as advertised by the server.
    pub status_location: Option<String>,
    pub errors: Vec<ErrorDescriptor>,
    pub outputs: Vec<ProcessOutput>,
}

/// Observed state of a single remote job run.
///
/// The status location is fixed at construction. Every successful status check
/// produces a new `Execution` around a freshly parsed [`StatusDocument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    status_location: String,
    response: StatusDocument,
}

impl Execution {
    pub fn new(status_location: impl Into<String>, response: StatusDocument) -> Self {
        Self {
            status_location: status_location.into(),
            response,
        }
    }

    pub fn status_location(&self) -> &str {
        &self.status_location
    }

    pub fn response(&self) -> &StatusDocument {
        &self.response
    }

    pub fn status(&self) -> JobStatus {
        self.response.status
    }

    pub fn is_complete(&self) -> bool {
        self.status().is_terminal()
    }

    /// Progress in percent. A succeeded execution is always at 100.
    pub fn percent_completed(&self) -> u8 {
        match self.status() {
            JobStatus::Succeeded => 100,
            _ => self.response.percent_completed.unwrap_or(0),
        }
    }

    /// Error descriptors, only ever non-empty for a failed execution.
    pub fn errors(&self) -> &[ErrorDescriptor] {
        match self.status() {
            JobStatus::Failed => &self.response.errors,
            _ => &[],
        }
    }

    pub fn output(&self, identifier: &str) -> Option<&ProcessOutput> {
        self.response
            .outputs
            .iter()
            .find(|output| output.identifier == identifier)
    }
}
