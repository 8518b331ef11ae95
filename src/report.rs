//! Console report sink and confirmation prompt for bulk runs.

use anyhow::Result;
use colored::Colorize;
use fanout::{ConfirmCallback, Identity, ItemOutcome, ReportSink, RunSummary};
use indicatif::ProgressBar;

use crate::progress;

/// Streams per-target results behind a progress bar and prints the
/// end-of-run summary exactly once.
pub struct ConsoleReport {
    label: &'static str,
    quiet: bool,
    pb: Option<ProgressBar>,
}

impl ConsoleReport {
    pub fn new(label: &'static str, quiet: bool) -> Self {
        Self {
            label,
            quiet,
            pb: None,
        }
    }
}

impl ReportSink for ConsoleReport {
    fn on_run_start(&mut self, total: usize) {
        if !self.quiet {
            self.pb = Some(progress::bar(total as u64, self.label));
        }
    }

    fn on_item(&mut self, identity: &Identity, outcome: &ItemOutcome) {
        let symbol = match outcome {
            ItemOutcome::Applied => "✓",
            ItemOutcome::Skipped { .. } => "⊘",
            ItemOutcome::Failed { .. } => "✗",
        };

        if let Some(pb) = &self.pb {
            pb.set_message(format!("{symbol} {identity}"));
            pb.inc(1);
        }

        match outcome {
            ItemOutcome::Failed { error } => log::warn!("{identity}: {error}"),
            ItemOutcome::Skipped { reason } => log::info!("{identity}: skipped ({reason})"),
            ItemOutcome::Applied => log::info!("{identity}: applied"),
        }
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        if let Some(pb) = self.pb.take() {
            pb.finish_and_clear();
        }

        println!();
        if summary.is_success() {
            println!("  {} {} complete", "✓".green().bold(), self.label);
        } else {
            println!("  {} {} completed with errors", "⚠".yellow().bold(), self.label);
        }

        if summary.applied > 0 {
            println!("    • {} targets changed", summary.applied);
        }
        if summary.skipped > 0 {
            println!("    • {} targets skipped", summary.skipped);
        }
        if summary.failed > 0 {
            println!("    • {} {} failed", summary.failed, "targets".red());
            if !self.quiet {
                for (identity, error) in summary.failures() {
                    println!("      {} {} - {}", "✗".red(), identity, error.dimmed());
                }
            }
        }
    }
}

/// Per-target confirmation via an interactive prompt.
pub struct PromptConfirm;

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?;

        Ok(confirmed)
    }
}
