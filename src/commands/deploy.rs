//! `drover deploy` - install or remove packages across a list of ids.

use anyhow::Result;

use super::{batch_from_target_args, finish, run_options};
use crate::Context;
use crate::action::{PackageAction, PackageOp};
use crate::cli::DeployArgs;
use crate::config::DroverConfig;
use crate::report::{ConsoleReport, PromptConfirm};
use crate::ui;

pub fn run(ctx: &Context, args: DeployArgs) -> Result<()> {
    let config = DroverConfig::load()?;

    ui::header("Software deployment");
    if args.run.dry_run {
        ui::warn("Dry run - no changes will be made");
    }

    let batch = batch_from_target_args(&args.target, "package")?;
    if !ctx.quiet {
        ui::kv("Installer", &config.deploy.installer);
        ui::kv("Packages", &batch.len().to_string());
    }

    let op = if args.remove {
        PackageOp::Remove
    } else {
        PackageOp::Install
    };
    let action = PackageAction::new(config.deploy.installer.as_str(), op);
    let opts = run_options(&args.run);
    let mut report = ConsoleReport::new("Packages", ctx.quiet);

    let summary = fanout::run(&batch, &action, &opts, &mut PromptConfirm, &mut report)?;
    finish(&summary, args.run.strict)
}
