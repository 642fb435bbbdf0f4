use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::poll::{ExitSignal, PollReport};
use crate::wps::{JobStatus, ProcessOutput};

/// Structured record of a finished run, printed with `--summary`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub status_location: String,
    pub outcome: ExitSignal,
    pub final_status: JobStatus,
    pub percent_completed: u8,
    pub checks: u32,
    pub transient_failures: u32,
    pub outputs: Vec<ProcessOutput>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl RunSummary {
    pub fn from_report(report: &PollReport, started_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        let execution = &report.execution;
        Self {
            status_location: execution.status_location().to_string(),
            outcome: report.signal.clone(),
            final_status: execution.status(),
            percent_completed: execution.percent_completed(),
            checks: report.stats.checks,
            transient_failures: report.stats.transient_failures,
            outputs: execution.response().outputs.clone(),
            started_at,
            completed_at: now,
            duration_ms: (now - started_at).num_milliseconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::PollStats;
    use crate::wps::{Execution, fixtures, parse_status_document};

    const LOCATION: &str = "http://wps.local/outputs/status-1.xml";

    #[test]
    fn summary_from_successful_report() {
        let report = PollReport {
            signal: ExitSignal::Success,
            execution: Execution::new(
                LOCATION,
                parse_status_document(&fixtures::succeeded(LOCATION)).unwrap(),
            ),
            stats: PollStats {
                checks: 4,
                transient_failures: 1,
            },
        };
        let started_at = Utc::now();

        let summary = RunSummary::from_report(&report, started_at);

        assert_eq!(summary.status_location, LOCATION);
        assert_eq!(summary.final_status, JobStatus::Succeeded);
        assert_eq!(summary.percent_completed, 100);
        assert_eq!(summary.checks, 4);
        assert_eq!(summary.outputs.len(), 2);
        assert!(summary.duration_ms >= 0);
    }

    #[test]
    fn summary_serializes_outcome() {
        let report = PollReport {
            signal: ExitSignal::GivingUp {
                attempts: 5,
                last_error: "HTTP 503".into(),
            },
            execution: Execution::new(
                LOCATION,
                parse_status_document(&fixtures::running(LOCATION, 20)).unwrap(),
            ),
            stats: PollStats {
                checks: 6,
                transient_failures: 5,
            },
        };

        let json = serde_json::to_value(RunSummary::from_report(&report, Utc::now())).unwrap();
        assert_eq!(json["outcome"]["signal"], "giving_up");
        assert_eq!(json["final_status"], "Running");
        assert_eq!(json["percent_completed"], 20);
    }
}
