//! The bulk run loop - applies one action per identity, in order,
//! isolating failures and summarizing at the end.

use crate::action::{ApplyOutcome, RemoteAction};
use crate::error::BatchError;
use crate::identity::Batch;
use crate::report::{ConfirmCallback, ReportSink};
use crate::session::{SessionGuard, SessionManager};
use crate::types::{ConfirmMode, ItemOutcome, RunOptions, RunSummary};

/// Run one batch: apply `action` to every identity in `batch`, in order.
///
/// # Arguments
/// * `batch` - the targets; must be non-empty
/// * `action` - the idempotent per-identity change
/// * `opts` - run options (isolation, abort, confirmation gating)
/// * `confirm` - confirmation callback, consulted per item when
///   `opts.confirm` is [`ConfirmMode::Always`]
/// * `report` - receives streamed results and the final summary
///
/// # Guarantees
/// * every identity reached yields exactly one recorded outcome;
/// * identities are never reordered and failed calls are never retried;
/// * with `continue_on_error=false` the run stops after the first failure
///   and the unreached identities are absent from the summary;
/// * with `isolate_errors=false` the first failure escapes as
///   [`BatchError::Aborted`], carrying the partial summary;
/// * the report sink sees the summary exactly once, abort included.
pub fn run<A, C, R>(
    batch: &Batch,
    action: &A,
    opts: &RunOptions,
    confirm: &mut C,
    report: &mut R,
) -> Result<RunSummary, BatchError>
where
    A: RemoteAction + ?Sized,
    C: ConfirmCallback,
    R: ReportSink,
{
    if batch.is_empty() {
        return Err(BatchError::NoTargets);
    }

    let mut summary = RunSummary::default();
    report.on_run_start(batch.len());

    for identity in batch {
        // Blank entries are a data problem, not an error: warn and move on.
        if identity.is_blank() {
            log::warn!("skipping blank identity in batch");
            let outcome = ItemOutcome::skipped("empty identity");
            report.on_item(identity, &outcome);
            summary.record(identity.clone(), outcome);
            continue;
        }

        if opts.confirm == ConfirmMode::DryRun {
            let outcome = ItemOutcome::skipped("dry-run");
            report.on_item(identity, &outcome);
            summary.record(identity.clone(), outcome);
            continue;
        }

        if opts.confirm == ConfirmMode::Always {
            let prompt = format!("{} on {}?", action.describe(), identity);
            let proceed = match confirm.confirm(&prompt) {
                Ok(answer) => answer,
                Err(e) => {
                    log::warn!("confirmation failed ({e}); declining {identity}");
                    false
                }
            };
            if !proceed {
                let outcome = ItemOutcome::skipped("declined");
                report.on_item(identity, &outcome);
                summary.record(identity.clone(), outcome);
                continue;
            }
        }

        let outcome = match action.apply(identity) {
            Ok(ApplyOutcome::Applied) => ItemOutcome::Applied,
            Ok(ApplyOutcome::Skipped { reason }) => ItemOutcome::Skipped { reason },
            Err(e) => {
                let error = format!("{e:#}");
                if !opts.isolate_errors {
                    let outcome = ItemOutcome::failed(error.clone());
                    report.on_item(identity, &outcome);
                    summary.record(identity.clone(), outcome);
                    report.on_run_complete(&summary);
                    return Err(BatchError::Aborted {
                        identity: identity.clone(),
                        error,
                        summary,
                    });
                }
                ItemOutcome::failed(error)
            }
        };

        let failed = outcome.is_failure();
        report.on_item(identity, &outcome);
        summary.record(identity.clone(), outcome);

        if failed && !opts.continue_on_error {
            log::info!("stopping after failure on {identity} (continue-on-error disabled)");
            break;
        }
    }

    report.on_run_complete(&summary);
    Ok(summary)
}

/// Run one batch against a backend session.
///
/// Validates the batch before any session work, opens the session once,
/// builds the action against it, runs, and closes the session exactly once
/// on every exit path. A close failure is logged and never masks the
/// computed summary.
pub fn run_with_session<M, A, F, C, R>(
    manager: &M,
    batch: &Batch,
    make_action: F,
    opts: &RunOptions,
    confirm: &mut C,
    report: &mut R,
) -> Result<RunSummary, BatchError>
where
    M: SessionManager,
    A: RemoteAction,
    F: FnOnce(&M::Session) -> A,
    C: ConfirmCallback,
    R: ReportSink,
{
    // An empty batch must be reported before a session is ever opened.
    if batch.is_empty() {
        return Err(BatchError::NoTargets);
    }

    let guard = SessionGuard::open(manager)?;
    let action = make_action(guard.session());
    run(batch, &action, opts, confirm, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use crate::identity::Identity;
    use crate::report::{AutoConfirm, AutoDecline, NullReport};
    use anyhow::bail;
    use std::cell::Cell;
    use std::collections::HashSet;

    /// Action that fails for a fixed set of identities and records every
    /// apply call it receives.
    struct ScriptedAction {
        fail_on: HashSet<String>,
        skip_on: HashSet<String>,
        calls: std::cell::RefCell<Vec<String>>,
    }

    impl ScriptedAction {
        fn new() -> Self {
            Self {
                fail_on: HashSet::new(),
                skip_on: HashSet::new(),
                calls: std::cell::RefCell::new(Vec::new()),
            }
        }

        fn failing_on(ids: &[&str]) -> Self {
            let mut action = Self::new();
            action.fail_on = ids.iter().map(ToString::to_string).collect();
            action
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl RemoteAction for ScriptedAction {
        fn describe(&self) -> String {
            "Scripted change".to_string()
        }

        fn apply(&self, identity: &Identity) -> anyhow::Result<ApplyOutcome> {
            self.calls.borrow_mut().push(identity.as_str().to_string());
            if self.fail_on.contains(identity.as_str()) {
                bail!("scripted failure for {identity}");
            }
            if self.skip_on.contains(identity.as_str()) {
                return Ok(ApplyOutcome::skipped("already configured"));
            }
            Ok(ApplyOutcome::Applied)
        }
    }

    fn batch(ids: &[&str]) -> Batch {
        ids.iter().copied().collect()
    }

    #[test]
    fn all_successes_yield_full_summary_in_order() {
        let action = ScriptedAction::new();
        let b = batch(&["a", "b", "c"]);
        let summary =
            run(&b, &action, &RunOptions::default(), &mut AutoConfirm, &mut NullReport).unwrap();

        assert_eq!(summary.applied, 3);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.total(), 3);
        let ids: Vec<&str> = summary.results().iter().map(|r| r.identity.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_batch_fails_fast() {
        let action = ScriptedAction::new();
        let err = run(
            &Batch::default(),
            &action,
            &RunOptions::default(),
            &mut AutoConfirm,
            &mut NullReport,
        )
        .unwrap_err();

        assert!(matches!(err, BatchError::NoTargets));
        assert_eq!(action.call_count(), 0);
    }

    #[test]
    fn blank_identities_are_skipped_not_applied() {
        let action = ScriptedAction::new();
        let b = batch(&["a", "", "   ", "b"]);
        let summary =
            run(&b, &action, &RunOptions::default(), &mut AutoConfirm, &mut NullReport).unwrap();

        assert_eq!(summary.applied, 2);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.total(), 4);
        assert_eq!(action.call_count(), 2);
        assert_eq!(
            summary.results()[1].outcome,
            ItemOutcome::skipped("empty identity")
        );
    }

    #[test]
    fn partial_failures_are_isolated() {
        let action = ScriptedAction::failing_on(&["b", "d"]);
        let b = batch(&["a", "b", "c", "d", "e"]);
        let summary =
            run(&b, &action, &RunOptions::default(), &mut AutoConfirm, &mut NullReport).unwrap();

        assert_eq!(summary.applied, 3);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.total(), 5);
        // All five identities were attempted.
        assert_eq!(action.call_count(), 5);

        let failures = summary.failures();
        assert_eq!(failures[0].0.as_str(), "b");
        assert_eq!(failures[1].0.as_str(), "d");
    }

    #[test]
    fn abort_on_error_stops_and_omits_unreached() {
        let action = ScriptedAction::failing_on(&["b", "d"]);
        let b = batch(&["a", "b", "c", "d", "e"]);
        let opts = RunOptions {
            continue_on_error: false,
            ..RunOptions::default()
        };
        let summary = run(&b, &action, &opts, &mut AutoConfirm, &mut NullReport).unwrap();

        assert_eq!(summary.applied, 1);
        assert_eq!(summary.failed, 1);
        // c, d, e are absent from the summary, not recorded as skipped.
        assert_eq!(summary.total(), 2);
        assert_eq!(action.call_count(), 2);
    }

    #[test]
    fn unisolated_failure_escapes_with_partial_summary() {
        let action = ScriptedAction::failing_on(&["b"]);
        let b = batch(&["a", "b", "c"]);
        let opts = RunOptions {
            isolate_errors: false,
            ..RunOptions::default()
        };
        let err = run(&b, &action, &opts, &mut AutoConfirm, &mut NullReport).unwrap_err();

        match err {
            BatchError::Aborted {
                identity, summary, ..
            } => {
                assert_eq!(identity.as_str(), "b");
                assert_eq!(summary.applied, 1);
                assert_eq!(summary.failed, 1);
                assert_eq!(summary.total(), 2);
            }
            other => panic!("expected Aborted, got {other:?}"),
        }
        assert_eq!(action.call_count(), 2);
    }

    #[test]
    fn dry_run_never_invokes_apply() {
        let action = ScriptedAction::failing_on(&["a", "b"]);
        let b = batch(&["a", "b"]);
        let opts = RunOptions {
            confirm: ConfirmMode::DryRun,
            ..RunOptions::default()
        };
        let summary = run(&b, &action, &opts, &mut AutoConfirm, &mut NullReport).unwrap();

        assert_eq!(action.call_count(), 0);
        assert_eq!(summary.skipped, 2);
        assert!(summary
            .results()
            .iter()
            .all(|r| r.outcome == ItemOutcome::skipped("dry-run")));
    }

    #[test]
    fn declined_confirmation_skips_item() {
        let action = ScriptedAction::new();
        let b = batch(&["a", "b"]);
        let opts = RunOptions {
            confirm: ConfirmMode::Always,
            ..RunOptions::default()
        };
        let summary = run(&b, &action, &opts, &mut AutoDecline, &mut NullReport).unwrap();

        assert_eq!(action.call_count(), 0);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.results()[0].outcome, ItemOutcome::skipped("declined"));
    }

    #[test]
    fn confirmed_items_are_applied() {
        let action = ScriptedAction::new();
        let b = batch(&["a"]);
        let opts = RunOptions {
            confirm: ConfirmMode::Always,
            ..RunOptions::default()
        };
        let summary = run(&b, &action, &opts, &mut AutoConfirm, &mut NullReport).unwrap();
        assert_eq!(summary.applied, 1);
    }

    #[test]
    fn second_run_reports_already_configured_as_skipped() {
        let mut action = ScriptedAction::new();
        action.skip_on.insert("a".to_string());
        let b = batch(&["a"]);
        let summary =
            run(&b, &action, &RunOptions::default(), &mut AutoConfirm, &mut NullReport).unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(summary.is_success());
    }

    /// Streaming sink that records callback order.
    struct RecordingSink {
        events: Vec<String>,
    }

    impl ReportSink for RecordingSink {
        fn on_run_start(&mut self, total: usize) {
            self.events.push(format!("start:{total}"));
        }

        fn on_item(&mut self, identity: &Identity, outcome: &ItemOutcome) {
            let tag = match outcome {
                ItemOutcome::Applied => "applied",
                ItemOutcome::Skipped { .. } => "skipped",
                ItemOutcome::Failed { .. } => "failed",
            };
            self.events.push(format!("{identity}:{tag}"));
        }

        fn on_run_complete(&mut self, summary: &RunSummary) {
            self.events.push(format!("complete:{}", summary.total()));
        }
    }

    #[test]
    fn report_sink_sees_stream_and_summary_once() {
        let action = ScriptedAction::failing_on(&["b"]);
        let b = batch(&["a", "b"]);
        let mut sink = RecordingSink { events: Vec::new() };
        run(&b, &action, &RunOptions::default(), &mut AutoConfirm, &mut sink).unwrap();

        assert_eq!(
            sink.events,
            vec!["start:2", "a:applied", "b:failed", "complete:2"]
        );
    }

    #[test]
    fn report_sink_sees_summary_once_on_abort() {
        let action = ScriptedAction::failing_on(&["a"]);
        let b = batch(&["a", "b"]);
        let opts = RunOptions {
            isolate_errors: false,
            ..RunOptions::default()
        };
        let mut sink = RecordingSink { events: Vec::new() };
        let _ = run(&b, &action, &opts, &mut AutoConfirm, &mut sink).unwrap_err();

        assert_eq!(sink.events, vec!["start:2", "a:failed", "complete:1"]);
    }

    struct CountingManager {
        opened: Cell<usize>,
        closed: Cell<usize>,
    }

    impl SessionManager for CountingManager {
        type Session = ();

        fn open(&self) -> Result<(), SessionError> {
            self.opened.set(self.opened.get() + 1);
            Ok(())
        }

        fn close(&self, _session: ()) -> Result<(), SessionError> {
            self.closed.set(self.closed.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn session_closed_exactly_once_on_success() {
        let manager = CountingManager {
            opened: Cell::new(0),
            closed: Cell::new(0),
        };
        let b = batch(&["a"]);
        run_with_session(
            &manager,
            &b,
            |_| ScriptedAction::new(),
            &RunOptions::default(),
            &mut AutoConfirm,
            &mut NullReport,
        )
        .unwrap();

        assert_eq!(manager.opened.get(), 1);
        assert_eq!(manager.closed.get(), 1);
    }

    #[test]
    fn session_closed_exactly_once_on_abort() {
        let manager = CountingManager {
            opened: Cell::new(0),
            closed: Cell::new(0),
        };
        let b = batch(&["a", "b"]);
        let opts = RunOptions {
            isolate_errors: false,
            ..RunOptions::default()
        };
        let err = run_with_session(
            &manager,
            &b,
            |_| ScriptedAction::failing_on(&["a"]),
            &opts,
            &mut AutoConfirm,
            &mut NullReport,
        )
        .unwrap_err();

        assert!(matches!(err, BatchError::Aborted { .. }));
        assert_eq!(manager.closed.get(), 1);
    }

    #[test]
    fn empty_batch_performs_no_session_io() {
        let manager = CountingManager {
            opened: Cell::new(0),
            closed: Cell::new(0),
        };
        let err = run_with_session(
            &manager,
            &Batch::default(),
            |_| ScriptedAction::new(),
            &RunOptions::default(),
            &mut AutoConfirm,
            &mut NullReport,
        )
        .unwrap_err();

        assert!(matches!(err, BatchError::NoTargets));
        assert_eq!(manager.opened.get(), 0);
        assert_eq!(manager.closed.get(), 0);
    }
}
