//! `drover netlat` - measure and log round-trip latency to hosts.

use anyhow::Result;
use std::path::PathBuf;

use super::{batch_from_target_args, finish, run_options};
use crate::Context;
use crate::action::LatencyAction;
use crate::cli::NetlatArgs;
use crate::config::{DroverConfig, state_dir};
use crate::report::{ConsoleReport, PromptConfirm};
use crate::ui;

pub fn run(ctx: &Context, args: NetlatArgs) -> Result<()> {
    let config = DroverConfig::load()?;

    ui::header("Network latency");

    let batch = batch_from_target_args(&args.target, "host")?;
    let probes = args.probes.unwrap_or(config.netlat.probes);
    let log_path = resolve_log_path(args.log.as_deref(), config.netlat.log_file.as_deref())?;

    if !ctx.quiet {
        ui::kv("Hosts", &batch.len().to_string());
        ui::kv("Log", &log_path.display().to_string());
    }

    let action = LatencyAction::new(probes, log_path);
    let opts = run_options(&args.run);
    let mut report = ConsoleReport::new("Hosts", ctx.quiet);

    let summary = fanout::run(&batch, &action, &opts, &mut PromptConfirm, &mut report)?;
    finish(&summary, args.run.strict)
}

fn resolve_log_path(cli: Option<&str>, configured: Option<&str>) -> Result<PathBuf> {
    if let Some(raw) = cli.or(configured) {
        let expanded = shellexpand::tilde(raw);
        return Ok(PathBuf::from(expanded.as_ref()));
    }
    Ok(state_dir()?.join("latency.log"))
}
