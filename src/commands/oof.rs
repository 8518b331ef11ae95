//! `drover oof` - bulk out-of-office configuration.

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use fanout::IdentitySource;
use graphkit::{
    AutoReplyConfig, AutoReplyState, ExternalAudience, GraphAuth, ScheduleWindow,
};

use super::{batch_from_target_args, finish, run_options};
use crate::Context;
use crate::action::AutoReplyAction;
use crate::cli::OofArgs;
use crate::config::{DroverConfig, OofDefaults};
use crate::progress;
use crate::report::{ConsoleReport, PromptConfirm};
use crate::session::GraphSessionManager;
use crate::source::DirectoryGroup;
use crate::ui;

pub fn run(ctx: &Context, args: OofArgs) -> Result<()> {
    let config = DroverConfig::load()?;
    let graph = config.graph()?;
    let auth = GraphAuth::new(
        graph.tenant_id.as_str(),
        graph.client_id.as_str(),
        graph.client_secret()?,
    );

    ui::header("Out-of-office");
    if args.run.dry_run {
        ui::warn("Dry run - no changes will be made");
    }

    let batch = match &args.group {
        Some(group) => {
            let pb = progress::spinner(&format!("Expanding group '{group}'..."));
            match DirectoryGroup::new(&auth, group.as_str()).load() {
                Ok(batch) => {
                    progress::finish_success(&pb, &format!("{} members in '{group}'", batch.len()));
                    batch
                }
                Err(e) => {
                    progress::finish_error(&pb, &format!("could not expand '{group}'"));
                    return Err(e.into());
                }
            }
        }
        None => batch_from_target_args(&args.target, "upn")?,
    };
    if !ctx.quiet {
        ui::kv("Mailboxes", &batch.len().to_string());
    }

    let desired = desired_config(&config.oof, &args)?;
    let opts = run_options(&args.run);
    let manager = GraphSessionManager::new(&auth);
    let mut report = ConsoleReport::new("Mailboxes", ctx.quiet);

    let summary = fanout::run_with_session(
        &manager,
        &batch,
        |conn| AutoReplyAction::new(conn.clone(), desired.clone()),
        &opts,
        &mut PromptConfirm,
        &mut report,
    )?;

    finish(&summary, args.run.strict)
}

/// Combine config defaults and CLI overrides into the desired posture.
fn desired_config(defaults: &OofDefaults, args: &OofArgs) -> Result<AutoReplyConfig> {
    if args.disable {
        return Ok(AutoReplyConfig::disabled());
    }

    let internal = args
        .message
        .clone()
        .unwrap_or_else(|| defaults.internal_message.clone());
    let external = args
        .external_message
        .clone()
        .or_else(|| {
            if defaults.external_message.is_empty() {
                None
            } else {
                Some(defaults.external_message.clone())
            }
        })
        .unwrap_or_else(|| internal.clone());

    let audience_token = args.audience.as_deref().unwrap_or(&defaults.external_audience);
    let external_audience = ExternalAudience::parse(audience_token).ok_or_else(|| {
        anyhow::anyhow!("unknown audience '{audience_token}' (use none, contacts, or all)")
    })?;

    let window = match (&args.start, &args.end) {
        (Some(start), Some(end)) => {
            let window = ScheduleWindow {
                start: parse_when(start)?,
                end: parse_when(end)?,
            };
            if window.end <= window.start {
                bail!("schedule window ends before it starts");
            }
            Some(window)
        }
        _ => None,
    };

    Ok(AutoReplyConfig {
        state: if window.is_some() {
            AutoReplyState::Scheduled
        } else {
            AutoReplyState::AlwaysEnabled
        },
        internal_message: internal,
        external_message: external,
        external_audience,
        window,
    })
}

/// Parse a user-supplied point in time (UTC). Accepts a date, or a date
/// with minutes or seconds, with `T` or a space between.
fn parse_when(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).expect("midnight exists").and_utc());
    }

    bail!("could not parse '{raw}' as a time (expected e.g. 2026-12-22T17:00)")
}
