//! Latency action - ping a host and append the result to a log file.

use anyhow::{Context, Result, bail};
use fanout::{ApplyOutcome, Identity, RemoteAction};
use regex::Regex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

/// Measures average round-trip time to one host and appends a
/// tab-separated `timestamp host avg_ms` record to the log file.
///
/// Measuring is the idempotent "change" here: repeating it converges on
/// the same remote state (none), it only adds log records locally.
pub struct LatencyAction {
    probes: u32,
    log_path: PathBuf,
}

impl LatencyAction {
    pub fn new(probes: u32, log_path: PathBuf) -> Self {
        Self { probes, log_path }
    }

    fn ping(&self, host: &str) -> Result<String> {
        let count = self.probes.to_string();
        let count_flag = if cfg!(windows) { "-n" } else { "-c" };

        let output = Command::new("ping")
            .args([count_flag, &count, host])
            .output()
            .context("Failed to run ping")?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() {
            bail!("{host} is unreachable");
        }
        Ok(stdout)
    }

    fn append_record(&self, host: &str, avg_ms: f64) -> Result<()> {
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Could not open {}", self.log_path.display()))?;
        writeln!(
            file,
            "{}\t{}\t{:.1}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            host,
            avg_ms
        )?;
        Ok(())
    }
}

/// Pull the average round-trip time out of ping output.
///
/// Windows: `Minimum = 1ms, Maximum = 4ms, Average = 2ms`
/// Unix:    `rtt min/avg/max/mdev = 0.045/0.049/0.053/0.004 ms`
fn parse_average_ms(output: &str) -> Option<f64> {
    let windows = Regex::new(r"Average = (\d+)ms").expect("valid regex");
    if let Some(caps) = windows.captures(output) {
        return caps[1].parse().ok();
    }

    let unix = Regex::new(r"= [\d.]+/([\d.]+)/").expect("valid regex");
    unix.captures(output).and_then(|caps| caps[1].parse().ok())
}

impl RemoteAction for LatencyAction {
    fn describe(&self) -> String {
        "Measure latency".to_string()
    }

    fn apply(&self, identity: &Identity) -> Result<ApplyOutcome> {
        let host = identity.as_str().trim();

        let output = self.ping(host)?;
        let avg_ms = parse_average_ms(&output)
            .ok_or_else(|| anyhow::anyhow!("no round-trip time in ping output for {host}"))?;

        self.append_record(host, avg_ms)?;
        log::info!("{host}: {avg_ms:.1} ms average over {} probes", self.probes);
        Ok(ApplyOutcome::Applied)
    }
}
