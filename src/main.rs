mod action;
mod cli;
mod commands;
mod config;
mod progress;
mod report;
mod session;
mod source;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    match cli.command {
        Command::Oof(args) => commands::oof::run(&ctx, args),
        Command::Deploy(args) => commands::deploy::run(&ctx, args),
        Command::Services(args) => commands::services::run(&ctx, args),
        Command::Tasks(args) => commands::tasks::run(&ctx, args),
        Command::Profiles(args) => commands::profiles::run(&ctx, args),
        Command::Gpo(args) => commands::gpo::run(&ctx, args),
        Command::Printq(args) => commands::printq::run(&ctx, args),
        Command::Netlat(args) => commands::netlat::run(&ctx, args),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "drover", &mut io::stdout());
            Ok(())
        }
    }
}
