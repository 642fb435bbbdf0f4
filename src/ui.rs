//! Terminal output: progress bar and colored results.
//!
//! Uses `indicatif` for the progress bar and `console` for styling.
//! [`PollProgress`] follows a running execution as a [`PollObserver`].

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::poll::{ExitSignal, PollObserver};
use crate::summary::RunSummary;
use crate::wps::{Execution, WpsError};

/// Visual feedback for one poll run.
///
/// The bar tracks `percentCompleted` and is only drawn when enabled. The
/// status location and the final verdict are always printed.
pub struct PollProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl PollProgress {
    pub fn new(show_bar: bool) -> Self {
        let pb = if show_bar {
            let pb = ProgressBar::new(100);
            pb.set_style(
                ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos:>3}% {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            pb
        } else {
            ProgressBar::hidden()
        };

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Print the status location of a freshly submitted execution.
    ///
    /// It can be opened in a browser and refreshed to follow the job by hand.
    pub fn submitted(&self, execution: &Execution) {
        self.pb.suspend(|| println!("{}", execution.status_location()));
        self.pb.set_message(execution.status().to_string());
    }

    pub fn print_summary(&self, summary: &RunSummary) {
        let style = match summary.outcome {
            ExitSignal::Success => &self.green,
            ExitSignal::Failure { .. } => &self.red,
            ExitSignal::GivingUp { .. } => &self.yellow,
        };
        println!();
        println!("{}", style.apply_to("─── Run Summary ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(summary).unwrap_or_default()
        );
    }
}

impl PollObserver for PollProgress {
    fn on_status(&mut self, execution: &Execution) {
        self.pb.set_position(u64::from(execution.percent_completed()));
        self.pb.set_message(execution.status().to_string());
    }

    fn on_retry(&mut self, attempt: u32, max: u32, error: &WpsError) {
        self.pb.println(format!(
            "  {} Retry {attempt}/{max}: {error}",
            self.yellow.apply_to("↻")
        ));
    }

    fn on_finish(&mut self, signal: &ExitSignal) {
        self.pb.finish_and_clear();
        match signal {
            ExitSignal::Success => {
                println!("  {} Workflow succeeded", self.green.apply_to("✓"));
            }
            ExitSignal::Failure { errors } => {
                println!("  {} Workflow failed", self.red.apply_to("✗"));
                for error in errors {
                    println!("    {}", error.text);
                }
            }
            ExitSignal::GivingUp { attempts, .. } => {
                println!(
                    "  {} Status unreadable after {attempts} attempts",
                    self.red.apply_to("✗")
                );
            }
        }
    }
}
