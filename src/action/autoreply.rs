//! Mailbox auto-reply action - out-of-office via Graph mailboxSettings.

use anyhow::Result;
use fanout::{ApplyOutcome, Identity, RemoteAction};
use graphkit::{AutoReplyConfig, AutoReplyState, Connection, RetryConfig, with_retry};

/// Sets (or clears) a mailbox's automatic replies.
///
/// Reads the current configuration first so a mailbox that already has the
/// desired posture is reported as skipped instead of rewritten.
pub struct AutoReplyAction {
    conn: Connection,
    desired: AutoReplyConfig,
    retry: RetryConfig,
}

impl AutoReplyAction {
    pub fn new(conn: Connection, desired: AutoReplyConfig) -> Self {
        Self {
            conn,
            desired,
            retry: RetryConfig::default(),
        }
    }
}

impl RemoteAction for AutoReplyAction {
    fn describe(&self) -> String {
        match self.desired.state {
            AutoReplyState::Disabled => "Disable auto-reply".to_string(),
            AutoReplyState::AlwaysEnabled => "Enable auto-reply".to_string(),
            AutoReplyState::Scheduled => "Schedule auto-reply".to_string(),
        }
    }

    fn apply(&self, identity: &Identity) -> Result<ApplyOutcome> {
        let upn = identity.as_str().trim();

        let current = with_retry(&self.retry, None, || self.conn.mailbox_auto_reply(upn))?;
        if self.desired.same_posture(&current) {
            return Ok(ApplyOutcome::skipped("already configured"));
        }

        with_retry(&self.retry, None, || {
            self.conn.set_mailbox_auto_reply(upn, &self.desired)
        })?;

        Ok(ApplyOutcome::Applied)
    }
}
