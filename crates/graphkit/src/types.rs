//! Core types for Graph mailbox and retry configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Auto-reply status of a mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutoReplyState {
    /// Auto-replies off.
    Disabled,
    /// Auto-replies on, no end date.
    AlwaysEnabled,
    /// Auto-replies on within a schedule window.
    Scheduled,
}

/// Who outside the organization receives the external reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExternalAudience {
    /// No external auto-replies.
    None,
    /// Only the user's contacts.
    ContactsOnly,
    /// Everyone.
    #[default]
    All,
}

impl ExternalAudience {
    /// Parse a config/CLI token (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "contacts" | "contactsonly" => Some(Self::ContactsOnly),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// UTC window during which scheduled auto-replies are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Desired auto-reply configuration for a mailbox.
///
/// The same struct describes both what we push and what we read back, so
/// an action can detect "already configured" before writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoReplyConfig {
    pub state: AutoReplyState,
    pub internal_message: String,
    pub external_message: String,
    pub external_audience: ExternalAudience,
    pub window: Option<ScheduleWindow>,
}

impl AutoReplyConfig {
    /// A configuration that turns auto-replies off.
    pub fn disabled() -> Self {
        Self {
            state: AutoReplyState::Disabled,
            internal_message: String::new(),
            external_message: String::new(),
            external_audience: ExternalAudience::All,
            window: None,
        }
    }

    /// Whether a remote configuration already matches this one in posture:
    /// state, audience, and schedule window.
    ///
    /// Message bodies are deliberately not compared - Exchange rewrites
    /// them into HTML on the way in, so a byte comparison would always
    /// report drift.
    pub fn same_posture(&self, remote: &AutoReplyConfig) -> bool {
        self.state == remote.state
            && (self.state == AutoReplyState::Disabled
                || (self.external_audience == remote.external_audience
                    && self.window == remote.window))
    }
}

/// A bearer token with its expiry.
#[derive(Debug, Clone)]
pub struct Token {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Whether the token is still usable, with a safety margin so a call
    /// issued now does not expire in flight.
    pub fn is_valid(&self) -> bool {
        Utc::now() + chrono::Duration::seconds(60) < self.expires_at
    }
}

/// Configuration for retry logic.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_factor: f64,
    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(2),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.as_secs_f64() * self.backoff_factor.powi(attempt as i32);
        let capped = delay.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// Create a config that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn external_audience_parse() {
        assert_eq!(ExternalAudience::parse("none"), Some(ExternalAudience::None));
        assert_eq!(
            ExternalAudience::parse("Contacts"),
            Some(ExternalAudience::ContactsOnly)
        );
        assert_eq!(ExternalAudience::parse("ALL"), Some(ExternalAudience::All));
        assert_eq!(ExternalAudience::parse("everyone"), None);
    }

    #[test]
    fn state_wire_names() {
        assert_eq!(
            serde_json::to_string(&AutoReplyState::AlwaysEnabled).unwrap(),
            "\"alwaysEnabled\""
        );
        assert_eq!(
            serde_json::to_string(&AutoReplyState::Disabled).unwrap(),
            "\"disabled\""
        );
        assert_eq!(
            serde_json::to_string(&ExternalAudience::ContactsOnly).unwrap(),
            "\"contactsOnly\""
        );
    }

    #[test]
    fn same_posture_ignores_bodies() {
        let window = Some(ScheduleWindow {
            start: Utc.with_ymd_and_hms(2025, 12, 22, 8, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap(),
        });
        let desired = AutoReplyConfig {
            state: AutoReplyState::Scheduled,
            internal_message: "Out until January".into(),
            external_message: "Out until January".into(),
            external_audience: ExternalAudience::All,
            window,
        };
        let mut remote = desired.clone();
        remote.internal_message = "<html><body>Out until January</body></html>".into();
        assert!(desired.same_posture(&remote));

        remote.external_audience = ExternalAudience::None;
        assert!(!desired.same_posture(&remote));
    }

    #[test]
    fn same_posture_disabled_ignores_audience() {
        let desired = AutoReplyConfig::disabled();
        let mut remote = AutoReplyConfig::disabled();
        remote.external_audience = ExternalAudience::ContactsOnly;
        assert!(desired.same_posture(&remote));
    }

    #[test]
    fn token_validity_margin() {
        let token = Token {
            access_token: "t".into(),
            expires_at: Utc::now() + chrono::Duration::seconds(30),
        };
        // Expires inside the 60s margin: not usable.
        assert!(!token.is_valid());

        let token = Token {
            access_token: "t".into(),
            expires_at: Utc::now() + chrono::Duration::seconds(3600),
        };
        assert!(token.is_valid());
    }

    #[test]
    fn retry_delay_backoff() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(4));
        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(8));
    }

    #[test]
    fn retry_delay_capped() {
        let config = RetryConfig {
            max_delay: Duration::from_secs(5),
            ..RetryConfig::default()
        };
        assert_eq!(config.delay_for_attempt(4), Duration::from_secs(5));
    }
}
