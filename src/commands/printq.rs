//! `drover printq` - clear stuck print queues.

use anyhow::Result;

use super::{batch_from_target_args, finish, run_options};
use crate::Context;
use crate::action::PrintQueueAction;
use crate::cli::PrintqArgs;
use crate::report::{ConsoleReport, PromptConfirm};
use crate::ui;

pub fn run(ctx: &Context, args: PrintqArgs) -> Result<()> {
    ui::header("Print queues");
    if args.run.dry_run {
        ui::warn("Dry run - no changes will be made");
    }

    let batch = batch_from_target_args(&args.target, "printer")?;
    if !ctx.quiet {
        if let Some(computer) = &args.computer {
            ui::kv("Print server", computer);
        }
        ui::kv("Printers", &batch.len().to_string());
    }

    let action = PrintQueueAction::new(args.computer.clone());
    let opts = run_options(&args.run);
    let mut report = ConsoleReport::new("Printers", ctx.quiet);

    let summary = fanout::run(&batch, &action, &opts, &mut PromptConfirm, &mut report)?;
    finish(&summary, args.run.strict)
}
