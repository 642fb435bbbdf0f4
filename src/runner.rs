use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::config::RunConfig;
use crate::error::RunError;
use crate::poll::{ExitSignal, PollLoop};
use crate::status::StatusChecker;
use crate::summary::RunSummary;
use crate::ui::PollProgress;
use crate::workflow::{REQUESTED_OUTPUTS, WORKFLOW_INPUT, load_workflow};
use crate::wps::{OutputValue, WpsClient};

/// Submit the workflow at `workflow_path` to `endpoint` and follow it until
/// the job reaches a verdict or its status stays unreadable.
pub async fn run_workflow(
    endpoint: &str,
    workflow_path: &Path,
    config: &RunConfig,
    progress: &mut PollProgress,
) -> Result<RunSummary, RunError> {
    let started_at = Utc::now();
    let workflow = load_workflow(workflow_path)?;

    info!("Calling a WPS instance at {endpoint}");
    let client = WpsClient::new(endpoint, &config.client_options()).map_err(RunError::Submit)?;

    info!(
        "Executing the process '{}' by providing the workflow from {}",
        config.identifier,
        workflow_path.display()
    );
    let inputs = [(WORKFLOW_INPUT.to_string(), workflow)];
    let outputs = REQUESTED_OUTPUTS.map(|name| (name.to_string(), true));
    let execution = client
        .execute(&config.identifier, &inputs, &outputs)
        .await
        .map_err(RunError::Submit)?;
    progress.submitted(&execution);

    let poll = PollLoop::new(
        StatusChecker::new(&client, config.settle_delay()),
        config.retry_policy(),
    );
    let report = poll.run(execution, progress).await.map_err(RunError::Status)?;

    if report.signal == ExitSignal::Success {
        for name in REQUESTED_OUTPUTS {
            if let Some(output) = report.execution.output(name) {
                match &output.value {
                    OutputValue::Reference { href, .. } => info!("{name}: {href}"),
                    OutputValue::Data(data) => info!("{name}: {data}"),
                }
            }
        }
    }

    Ok(RunSummary::from_report(&report, started_at))
}

/// Process exit code for a finished run.
///
/// A job verdict maps to 0 or 1; an unreadable status is an error for the
/// caller to surface.
pub fn exit_code(signal: &ExitSignal) -> Result<u8, RunError> {
    match signal {
        ExitSignal::Success => Ok(0),
        ExitSignal::Failure { .. } => Ok(1),
        ExitSignal::GivingUp {
            attempts,
            last_error,
        } => Err(RunError::RetriesExhausted {
            attempts: *attempts,
            last_error: last_error.clone(),
        }),
    }
}
