//! `drover services` - ensure services are running.

use anyhow::Result;

use super::{batch_from_target_args, finish, run_options};
use crate::Context;
use crate::action::ServiceAction;
use crate::cli::ServicesArgs;
use crate::report::{ConsoleReport, PromptConfirm};
use crate::ui;

pub fn run(ctx: &Context, args: ServicesArgs) -> Result<()> {
    ui::header("Service health");
    if args.run.dry_run {
        ui::warn("Dry run - no changes will be made");
    }

    let batch = batch_from_target_args(&args.target, "service")?;
    let opts = run_options(&args.run);
    let mut report = ConsoleReport::new("Services", ctx.quiet);

    let summary = fanout::run(&batch, &ServiceAction, &opts, &mut PromptConfirm, &mut report)?;
    finish(&summary, args.run.strict)
}
