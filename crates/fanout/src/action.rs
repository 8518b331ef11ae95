//! Remote action trait - the per-identity state change.

use crate::identity::Identity;
use anyhow::Result;

/// Outcome of a successful [`RemoteAction::apply`] call.
///
/// Failure is not a variant here: an action reports failure by returning
/// `Err`, which the driver converts into [`ItemOutcome::Failed`] when error
/// isolation is on.
///
/// [`ItemOutcome::Failed`]: crate::ItemOutcome::Failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The remote state was changed.
    Applied,
    /// Nothing was done, with a reason (already in the desired state,
    /// excluded by policy, nothing queued, ...).
    Skipped { reason: String },
}

impl ApplyOutcome {
    /// Convenience constructor for the skipped case.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }
}

/// One idempotent configuration change, applied per identity.
///
/// Implementations must be idempotent: applying the same action twice to
/// the same identity with the same configuration converges to the same end
/// state. The driver offers no transaction or undo semantics, and never
/// retries a failed call - retries, if desired, are the caller's business
/// (build a new [`Batch`] from [`RunSummary::failures`]).
///
/// An action that finds the target already in the desired state should
/// return [`ApplyOutcome::Skipped`] with a reason rather than `Applied`, so
/// the summary distinguishes work done from work not needed.
///
/// [`Batch`]: crate::Batch
/// [`RunSummary::failures`]: crate::RunSummary::failures
pub trait RemoteAction {
    /// Short human-readable description of the change, used in
    /// confirmation prompts and progress output (e.g. "Set auto-reply",
    /// "Install 7zip.7zip").
    fn describe(&self) -> String;

    /// Apply the change to one identity.
    ///
    /// May block on network or subprocess I/O; the driver imposes no
    /// timeout of its own.
    fn apply(&self, identity: &Identity) -> Result<ApplyOutcome>;
}
