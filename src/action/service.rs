//! Service action - bring a Windows service to the running state.

use anyhow::{Context, Result, bail};
use fanout::{ApplyOutcome, Identity, RemoteAction};
use std::process::Command;

/// Starts a service unless it is already running.
pub struct ServiceAction;

/// Extract the STATE value from `sc query` output.
///
/// The relevant line looks like:
/// ```text
///         STATE              : 4  RUNNING
/// ```
fn parse_state(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find(|l| l.trim_start().starts_with("STATE"))
        .and_then(|l| l.split_whitespace().last())
        .map(ToString::to_string)
}

impl ServiceAction {
    fn query_state(&self, name: &str) -> Result<String> {
        let output = Command::new("sc.exe")
            .args(["query", name])
            .output()
            .context("Failed to run sc query")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            bail!("service '{name}' could not be queried: {detail}");
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_state(&stdout)
            .ok_or_else(|| anyhow::anyhow!("unexpected sc query output for '{name}'"))
    }
}

impl RemoteAction for ServiceAction {
    fn describe(&self) -> String {
        "Start service".to_string()
    }

    fn apply(&self, identity: &Identity) -> Result<ApplyOutcome> {
        let name = identity.as_str().trim();

        if self.query_state(name)? == "RUNNING" {
            return Ok(ApplyOutcome::skipped("already running"));
        }

        let output = Command::new("sc.exe")
            .args(["start", name])
            .output()
            .context("Failed to run sc start")?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            bail!("could not start '{name}': {}", stdout.trim());
        }

        Ok(ApplyOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUNNING_OUTPUT: &str = "\
SERVICE_NAME: Spooler\r
        TYPE               : 110  WIN32_OWN_PROCESS  (interactive)\r
        STATE              : 4  RUNNING\r
                                (STOPPABLE, NOT_PAUSABLE, ACCEPTS_SHUTDOWN)\r
        WIN32_EXIT_CODE    : 0  (0x0)\r
";

    const STOPPED_OUTPUT: &str = "\
SERVICE_NAME: Spooler\r
        TYPE               : 110  WIN32_OWN_PROCESS  (interactive)\r
        STATE              : 1  STOPPED\r
        WIN32_EXIT_CODE    : 0  (0x0)\r
";

    #[test]
    fn parses_running_state() {
        assert_eq!(parse_state(RUNNING_OUTPUT).as_deref(), Some("RUNNING"));
    }

    #[test]
    fn parses_stopped_state() {
        assert_eq!(parse_state(STOPPED_OUTPUT).as_deref(), Some("STOPPED"));
    }

    #[test]
    fn missing_state_line_is_none() {
        assert_eq!(parse_state("[SC] EnumQueryServicesStatus failed 1060"), None);
    }
}
