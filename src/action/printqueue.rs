//! Print queue action - drop every queued job on a printer.

use super::{powershell, ps_quote};
use anyhow::{Result, bail};
use fanout::{ApplyOutcome, Identity, RemoteAction};

/// Clears a printer's queue, locally or on a print server.
pub struct PrintQueueAction {
    computer: Option<String>,
}

impl PrintQueueAction {
    pub fn new(computer: Option<String>) -> Self {
        Self { computer }
    }

    fn computer_clause(&self) -> String {
        match &self.computer {
            Some(host) => format!(" -ComputerName '{}'", ps_quote(host)),
            None => String::new(),
        }
    }

    fn job_count(&self, printer: &str) -> Result<usize> {
        let script = format!(
            "@(Get-PrintJob -PrinterName '{}'{} -ErrorAction Stop).Count",
            ps_quote(printer),
            self.computer_clause()
        );
        let output = powershell(&script)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("printer '{printer}' could not be queried: {}", stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("unexpected job count output for '{printer}'"))
    }
}

impl RemoteAction for PrintQueueAction {
    fn describe(&self) -> String {
        "Clear print queue".to_string()
    }

    fn apply(&self, identity: &Identity) -> Result<ApplyOutcome> {
        let printer = identity.as_str().trim();

        let count = self.job_count(printer)?;
        if count == 0 {
            return Ok(ApplyOutcome::skipped("queue empty"));
        }

        let script = format!(
            "Get-PrintJob -PrinterName '{}'{} | Remove-PrintJob",
            ps_quote(printer),
            self.computer_clause()
        );
        let output = powershell(&script)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("could not clear '{printer}': {}", stderr.trim());
        }

        log::info!("{printer}: removed {count} queued jobs");
        Ok(ApplyOutcome::Applied)
    }
}
