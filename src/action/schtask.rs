//! Scheduled task action - register a task if none of that name exists.

use anyhow::{Context, Result, bail};
use fanout::{ApplyOutcome, Identity, RemoteAction};
use std::process::Command;

/// Registers a scheduled task per target name, skipping names that are
/// already registered. Existing tasks are never replaced or modified.
pub struct SchtaskAction {
    task_run: String,
    schedule: String,
    start_time: Option<String>,
}

impl SchtaskAction {
    pub fn new(
        task_run: impl Into<String>,
        schedule: impl Into<String>,
        start_time: Option<String>,
    ) -> Self {
        Self {
            task_run: task_run.into(),
            schedule: schedule.into(),
            start_time,
        }
    }

    fn exists(&self, name: &str) -> Result<bool> {
        let output = Command::new("schtasks.exe")
            .args(["/Query", "/TN", name])
            .output()
            .context("Failed to run schtasks /Query")?;
        // /Query exits non-zero when the task does not exist.
        Ok(output.status.success())
    }
}

impl RemoteAction for SchtaskAction {
    fn describe(&self) -> String {
        format!("Register {} task", self.schedule)
    }

    fn apply(&self, identity: &Identity) -> Result<ApplyOutcome> {
        let name = identity.as_str().trim();

        if self.exists(name)? {
            return Ok(ApplyOutcome::skipped("already registered"));
        }

        let mut args = vec![
            "/Create",
            "/TN",
            name,
            "/TR",
            self.task_run.as_str(),
            "/SC",
            self.schedule.as_str(),
            "/RU",
            "SYSTEM",
        ];
        if let Some(at) = &self.start_time {
            args.push("/ST");
            args.push(at.as_str());
        }

        let output = Command::new("schtasks.exe")
            .args(&args)
            .output()
            .context("Failed to run schtasks /Create")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let detail = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            bail!("could not register task '{name}': {detail}");
        }

        Ok(ApplyOutcome::Applied)
    }
}
