//! `drover gpo` - security filtering for a batch of GPOs.

use anyhow::Result;

use super::{batch_from_target_args, finish, run_options};
use crate::Context;
use crate::action::GpoFilterAction;
use crate::cli::GpoArgs;
use crate::report::{ConsoleReport, PromptConfirm};
use crate::ui;

pub fn run(ctx: &Context, args: GpoArgs) -> Result<()> {
    ui::header("GPO security filtering");
    if args.run.dry_run {
        ui::warn("Dry run - no changes will be made");
    }

    let batch = batch_from_target_args(&args.target, "gpo")?;
    if !ctx.quiet {
        ui::kv("Grant to", &args.grant);
        ui::kv("Policies", &batch.len().to_string());
        if args.keep_authenticated_users {
            ui::dim("Authenticated Users Apply entry will be kept");
        }
    }

    let action = GpoFilterAction::new(args.grant.as_str(), !args.keep_authenticated_users);
    let opts = run_options(&args.run);
    let mut report = ConsoleReport::new("Policies", ctx.quiet);

    let summary = fanout::run(&batch, &action, &opts, &mut PromptConfirm, &mut report)?;
    finish(&summary, args.run.strict)
}
