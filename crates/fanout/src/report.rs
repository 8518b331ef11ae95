//! Report and confirmation callbacks.
//!
//! These traits let the driver stream results and ask for confirmation
//! without depending on any particular UI.

use crate::identity::Identity;
use crate::types::{ItemOutcome, RunSummary};
use anyhow::Result;

/// Receives streamed per-item results and, exactly once, the final summary.
pub trait ReportSink {
    /// Called once before the first identity is processed.
    fn on_run_start(&mut self, total: usize);

    /// Called once per processed identity, in batch order, as results
    /// occur.
    fn on_item(&mut self, identity: &Identity, outcome: &ItemOutcome);

    /// Called exactly once at the end of a run - normal completion or
    /// abort - with the finalized summary.
    fn on_run_complete(&mut self, summary: &RunSummary);
}

/// No-op report sink.
pub struct NullReport;

impl ReportSink for NullReport {
    fn on_run_start(&mut self, _total: usize) {}
    fn on_item(&mut self, _identity: &Identity, _outcome: &ItemOutcome) {}
    fn on_run_complete(&mut self, _summary: &RunSummary) {}
}

/// Asks whether one mutating call may proceed.
///
/// Used when the run's confirm mode is [`ConfirmMode::Always`]. An `Err`
/// from the callback (closed stdin, no tty) is treated by the driver as a
/// decline - the safe direction for an unattended batch.
///
/// [`ConfirmMode::Always`]: crate::ConfirmMode::Always
pub trait ConfirmCallback {
    /// Ask the user to confirm an action.
    ///
    /// Returns `true` if the user confirmed, `false` otherwise.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Auto-confirm callback (always returns true).
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false).
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}
