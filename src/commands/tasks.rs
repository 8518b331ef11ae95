//! `drover tasks` - register missing scheduled tasks.

use anyhow::Result;

use super::{batch_from_target_args, finish, run_options};
use crate::Context;
use crate::action::SchtaskAction;
use crate::cli::TasksArgs;
use crate::report::{ConsoleReport, PromptConfirm};
use crate::ui;

pub fn run(ctx: &Context, args: TasksArgs) -> Result<()> {
    ui::header("Scheduled tasks");
    if args.run.dry_run {
        ui::warn("Dry run - no changes will be made");
    }

    let batch = batch_from_target_args(&args.target, "task")?;
    if !ctx.quiet {
        ui::kv("Runs", &args.task_run);
        ui::kv("Schedule", &args.schedule);
    }

    let action = SchtaskAction::new(args.task_run.as_str(), args.schedule.as_str(), args.at.clone());
    let opts = run_options(&args.run);
    let mut report = ConsoleReport::new("Tasks", ctx.quiet);

    let summary = fanout::run(&batch, &action, &opts, &mut PromptConfirm, &mut report)?;
    finish(&summary, args.run.strict)
}
