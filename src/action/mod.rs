//! Remote action adapters - one idempotent change per target, behind
//! [`fanout::RemoteAction`].
//!
//! Each adapter wraps exactly one external facility (Graph, the package
//! installer, a Windows management command) and reports "already in the
//! desired state" as a skip rather than a change.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::process::{Command, Output};

pub mod autoreply;
pub mod gpo;
pub mod latency;
pub mod package;
pub mod printqueue;
pub mod profile;
pub mod schtask;
pub mod service;

pub use autoreply::AutoReplyAction;
pub use gpo::GpoFilterAction;
pub use latency::LatencyAction;
pub use package::{PackageAction, PackageOp};
pub use printqueue::PrintQueueAction;
pub use profile::ProfileAction;
pub use schtask::SchtaskAction;
pub use service::ServiceAction;

/// Run a PowerShell snippet non-interactively and capture its output.
pub(crate) fn powershell(script: &str) -> Result<Output> {
    Command::new("powershell.exe")
        .args(["-NoProfile", "-NonInteractive", "-Command", script])
        .output()
        .context("Failed to run powershell.exe")
}

/// Quote a value for interpolation into a single-quoted PowerShell string.
pub(crate) fn ps_quote(value: &str) -> String {
    value.replace('\'', "''")
}

/// Parse the `\/Date(1690000000000)\/` form ConvertTo-Json uses for CIM
/// datetimes.
pub(crate) fn parse_cim_date(raw: &str) -> Option<DateTime<Utc>> {
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    let millis: i64 = digits.parse().ok()?;
    DateTime::from_timestamp_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn cim_date_parses_millis() {
        let parsed = parse_cim_date("/Date(1700000000000)/").unwrap();
        assert_eq!(parsed, Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());
    }

    #[test]
    fn cim_date_rejects_garbage() {
        assert!(parse_cim_date("not a date").is_none());
        assert!(parse_cim_date("/Date()/").is_none());
    }

    #[test]
    fn ps_quote_doubles_single_quotes() {
        assert_eq!(ps_quote("O'Brien"), "O''Brien");
        assert_eq!(ps_quote("plain"), "plain");
    }
}
