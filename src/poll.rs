use std::time::Duration;

use serde::Serialize;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::status::{Source, StatusChecker};
use crate::wps::{ErrorDescriptor, Execution, Fetcher, JobStatus, WpsError};

/// Bounds on how long transient status-check failures are tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive failed checks after which the loop gives up.
    pub max_retries: u32,
    /// Pause between a failed check and the next attempt.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// How a poll run ended. Exactly one is produced per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum ExitSignal {
    /// The remote job succeeded.
    Success,
    /// The remote job reported failure with these errors.
    Failure { errors: Vec<ErrorDescriptor> },
    /// The status document could not be read `attempts` times in a row.
    GivingUp { attempts: u32, last_error: String },
}

impl ExitSignal {
    /// The job's error texts, one per line. Empty unless `Failure`.
    pub fn failure_message(&self) -> String {
        match self {
            ExitSignal::Failure { errors } => errors
                .iter()
                .map(|e| e.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            _ => String::new(),
        }
    }
}

/// Receives progress from a running [`PollLoop`].
///
/// Every method defaults to doing nothing.
pub trait PollObserver {
    /// A status document was read successfully.
    fn on_status(&mut self, _execution: &Execution) {}
    /// A check failed and will be retried; `attempt` counts consecutive failures.
    fn on_retry(&mut self, _attempt: u32, _max: u32, _error: &WpsError) {}
    /// The loop reached its terminal decision.
    fn on_finish(&mut self, _signal: &ExitSignal) {}
}

impl PollObserver for () {}

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PollStats {
    /// Status checks attempted, failed ones included.
    pub checks: u32,
    /// Checks that failed with a transient error.
    pub transient_failures: u32,
}

/// Result of [`PollLoop::run`].
#[derive(Debug, Clone)]
pub struct PollReport {
    pub signal: ExitSignal,
    /// The last successfully observed state of the execution.
    pub execution: Execution,
    pub stats: PollStats,
}

/// Polls an execution's status location until the job succeeds, fails, or
/// the status document stays unreadable for `max_retries` checks in a row.
///
/// There is no overall deadline. A job that keeps reporting progress is
/// followed for as long as it runs.
pub struct PollLoop<F> {
    checker: StatusChecker<F>,
    policy: RetryPolicy,
}

impl<F: Fetcher> PollLoop<F> {
    pub fn new(checker: StatusChecker<F>, policy: RetryPolicy) -> Self {
        Self { checker, policy }
    }

    /// Drive `execution` to a terminal decision.
    ///
    /// Transient errors are retried with the same status location. Any other
    /// checker error is returned immediately.
    pub async fn run(
        &self,
        mut execution: Execution,
        observer: &mut impl PollObserver,
    ) -> Result<PollReport, WpsError> {
        let mut retries: u32 = 0;
        let mut stats = PollStats::default();

        let signal = loop {
            if execution.is_complete() {
                break terminal_signal(&execution);
            }

            stats.checks += 1;
            let source = Source::from_parts(Some(execution.status_location().to_string()), None)?;
            match self.checker.check_status(source).await {
                Ok(checked) => {
                    retries = 0;
                    execution = checked;
                    info!(
                        status = %execution.status(),
                        percent = execution.percent_completed(),
                        "status : {}",
                        execution
                            .response()
                            .status_message
                            .as_deref()
                            .unwrap_or_default()
                    );
                    observer.on_status(&execution);
                }
                Err(e) if e.is_transient() => {
                    retries += 1;
                    stats.transient_failures += 1;
                    if retries >= self.policy.max_retries {
                        error!(attempts = retries, error = %e, "could not read status document, giving up");
                        break ExitSignal::GivingUp {
                            attempts: retries,
                            last_error: e.to_string(),
                        };
                    }
                    warn!(
                        attempt = retries,
                        max = self.policy.max_retries,
                        error = %e,
                        "could not read status document, trying again"
                    );
                    observer.on_retry(retries, self.policy.max_retries, &e);
                    sleep(self.policy.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        };

        match &signal {
            ExitSignal::Success => info!("status_message : Succeeded"),
            ExitSignal::Failure { .. } => {
                info!("status_message : Failed\n{}", signal.failure_message())
            }
            ExitSignal::GivingUp { .. } => {}
        }
        observer.on_finish(&signal);

        Ok(PollReport {
            signal,
            execution,
            stats,
        })
    }
}

fn terminal_signal(execution: &Execution) -> ExitSignal {
    match execution.status() {
        JobStatus::Failed => ExitSignal::Failure {
            errors: execution.errors().to_vec(),
        },
        _ => ExitSignal::Success,
    }
}
