//! `drover profiles` - remove stale local user profiles.

use anyhow::Result;
use fanout::IdentitySource;

use super::{batch_from_target_args, finish, run_options};
use crate::Context;
use crate::action::ProfileAction;
use crate::cli::ProfilesArgs;
use crate::config::DroverConfig;
use crate::report::{ConsoleReport, PromptConfirm};
use crate::source::ProfileScan;
use crate::ui;

pub fn run(ctx: &Context, args: ProfilesArgs) -> Result<()> {
    let config = DroverConfig::load()?;
    let max_age_days = args.max_age.unwrap_or(config.profiles.max_age_days);

    ui::header("Profile cleanup");
    if args.run.dry_run {
        ui::warn("Dry run - no changes will be made");
    }

    let batch = if args.scan {
        let batch = ProfileScan::new(max_age_days).load()?;
        // A clean machine is a fine outcome for a scan, not a batch error.
        if batch.is_empty() {
            ui::success(&format!("No profiles unused for more than {max_age_days} days"));
            return Ok(());
        }
        batch
    } else {
        batch_from_target_args(&args.target, "sid")?
    };

    if !ctx.quiet {
        ui::kv("Profiles", &batch.len().to_string());
        ui::kv("Stale after", &format!("{max_age_days} days"));
    }

    let action = ProfileAction::new(config.profiles.exclude.clone(), max_age_days);
    let opts = run_options(&args.run);
    let mut report = ConsoleReport::new("Profiles", ctx.quiet);

    let summary = fanout::run(&batch, &action, &opts, &mut PromptConfirm, &mut report)?;
    finish(&summary, args.run.strict)
}
