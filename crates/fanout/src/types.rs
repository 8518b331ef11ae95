//! Core types for bulk runs: options, per-item outcomes, summaries.

use crate::identity::Identity;
use serde::{Deserialize, Serialize};

/// How mutating calls are gated during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfirmMode {
    /// Prompt before every mutating call; a declined prompt records
    /// `Skipped("declined")` for that identity.
    Always,
    /// Proceed unattended.
    #[default]
    Never,
    /// Report what would be done without ever invoking the action.
    DryRun,
}

/// Options for one bulk run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// When false, the driver stops after the first failed identity; the
    /// remaining identities are absent from the summary, not skipped.
    pub continue_on_error: bool,
    /// Confirmation gating for mutating calls.
    pub confirm: ConfirmMode,
    /// When true (the default), an error from one identity's apply call is
    /// captured as `Failed` and the batch continues. When false, the first
    /// error propagates out of the run, aborting the remainder.
    pub isolate_errors: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            confirm: ConfirmMode::Never,
            isolate_errors: true,
        }
    }
}

/// Recorded outcome for one identity.
///
/// Never mutated after creation; collected into a [`RunSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemOutcome {
    /// The change was applied.
    Applied,
    /// Nothing was done, with a reason ("dry-run", "declined",
    /// "empty identity", or an action-supplied reason).
    Skipped { reason: String },
    /// The apply call failed.
    Failed { error: String },
}

impl ItemOutcome {
    /// Convenience constructor for the skipped case.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for the failed case.
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    /// Whether this outcome represents a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// One identity paired with its recorded outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub identity: Identity,
    pub outcome: ItemOutcome,
}

/// Aggregate outcome of one bulk run.
///
/// Results appear in batch order, exactly one per processed identity.
/// Identities never reached because the run was aborted are absent, not
/// recorded as skipped - the distinction is observable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
    results: Vec<ItemResult>,
}

impl RunSummary {
    /// Record one processed identity. Called once per item by the driver.
    pub(crate) fn record(&mut self, identity: Identity, outcome: ItemOutcome) {
        match &outcome {
            ItemOutcome::Applied => self.applied += 1,
            ItemOutcome::Skipped { .. } => self.skipped += 1,
            ItemOutcome::Failed { .. } => self.failed += 1,
        }
        self.results.push(ItemResult { identity, outcome });
    }

    /// Per-item results in batch order.
    pub fn results(&self) -> &[ItemResult] {
        &self.results
    }

    /// The failed identities with their error messages, in batch order.
    pub fn failures(&self) -> Vec<(&Identity, &str)> {
        self.results
            .iter()
            .filter_map(|r| match &r.outcome {
                ItemOutcome::Failed { error } => Some((&r.identity, error.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Total number of identities processed.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Whether the run had no failures.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}
