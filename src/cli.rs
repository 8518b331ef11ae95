use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "drover")]
#[command(version)]
#[command(about = "Unified CLI for bulk Microsoft 365 / Active Directory administration", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Set out-of-office auto-replies on a batch of mailboxes
    Oof(OofArgs),

    /// Install or remove software packages via the platform installer
    Deploy(DeployArgs),

    /// Ensure Windows services are running
    Services(ServicesArgs),

    /// Register scheduled tasks that are not present yet
    Tasks(TasksArgs),

    /// Remove stale local user profiles by SID
    Profiles(ProfilesArgs),

    /// Re-target GPO security filtering to a security group
    Gpo(GpoArgs),

    /// Clear stuck print queues
    Printq(PrintqArgs),

    /// Measure and log network round-trip latency to hosts
    Netlat(NetlatArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Shared batch flags
// ============================================================================

/// Where the targets of a run come from.
#[derive(Args)]
pub struct TargetArgs {
    /// Targets given directly on the command line
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Roster file with one target per row (comma- or tab-delimited, header row)
    #[arg(short, long, value_name = "PATH", conflicts_with = "targets")]
    pub file: Option<String>,

    /// Column of the roster file to project targets from
    #[arg(short, long, value_name = "NAME", requires = "file")]
    pub column: Option<String>,
}

/// How the run behaves.
#[derive(Args)]
pub struct RunArgs {
    /// Report what would be done without doing it
    #[arg(short = 'n', long, conflicts_with = "interactive")]
    pub dry_run: bool,

    /// Prompt before each change
    #[arg(short, long)]
    pub interactive: bool,

    /// Stop at the first failed target; unreached targets stay unprocessed
    #[arg(long)]
    pub stop_on_error: bool,

    /// Let the first failure abort the run and propagate as an error
    #[arg(long, conflicts_with = "stop_on_error")]
    pub no_isolate: bool,

    /// Exit non-zero when any target failed
    #[arg(long)]
    pub strict: bool,
}

// ============================================================================
// Out-of-office
// ============================================================================

#[derive(Args)]
pub struct OofArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Take targets from a directory group's membership
    #[arg(short, long, value_name = "NAME", conflicts_with_all = ["targets", "file"])]
    pub group: Option<String>,

    #[command(flatten)]
    pub run: RunArgs,

    /// Turn auto-replies off instead of on
    #[arg(long)]
    pub disable: bool,

    /// Schedule window start (2026-12-22T17:00 or 2026-12-22), UTC
    #[arg(long, value_name = "WHEN", requires = "end", conflicts_with = "disable")]
    pub start: Option<String>,

    /// Schedule window end, UTC
    #[arg(long, value_name = "WHEN", requires = "start", conflicts_with = "disable")]
    pub end: Option<String>,

    /// Override the reply body shown inside the organization
    #[arg(long, value_name = "TEXT")]
    pub message: Option<String>,

    /// Override the reply body shown outside the organization
    #[arg(long, value_name = "TEXT")]
    pub external_message: Option<String>,

    /// Who outside the organization gets a reply: none, contacts, all
    #[arg(long, value_name = "WHO")]
    pub audience: Option<String>,
}

// ============================================================================
// Software deployment
// ============================================================================

#[derive(Args)]
pub struct DeployArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub run: RunArgs,

    /// Remove the packages instead of installing them
    #[arg(long)]
    pub remove: bool,
}

// ============================================================================
// Services
// ============================================================================

#[derive(Args)]
pub struct ServicesArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub run: RunArgs,
}

// ============================================================================
// Scheduled tasks
// ============================================================================

#[derive(Args)]
pub struct TasksArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub run: RunArgs,

    /// Command line the task runs
    #[arg(long = "task-run", value_name = "CMDLINE")]
    pub task_run: String,

    /// Schedule type (ONCE, DAILY, WEEKLY, ONLOGON, ...)
    #[arg(long, value_name = "SC", default_value = "DAILY")]
    pub schedule: String,

    /// Start time for the schedule (HH:MM)
    #[arg(long, value_name = "HH:MM")]
    pub at: Option<String>,
}

// ============================================================================
// Profile cleanup
// ============================================================================

#[derive(Args)]
pub struct ProfilesArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub run: RunArgs,

    /// Discover stale profiles on this machine instead of naming SIDs
    #[arg(long, conflicts_with_all = ["targets", "file"])]
    pub scan: bool,

    /// Age in days beyond which an unused profile counts as stale
    #[arg(long, value_name = "DAYS")]
    pub max_age: Option<i64>,
}

// ============================================================================
// GPO security filtering
// ============================================================================

#[derive(Args)]
pub struct GpoArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub run: RunArgs,

    /// Security group that should receive Apply permission
    #[arg(long, value_name = "GROUP")]
    pub grant: String,

    /// Leave the Authenticated Users Apply entry in place
    #[arg(long)]
    pub keep_authenticated_users: bool,
}

// ============================================================================
// Print queues
// ============================================================================

#[derive(Args)]
pub struct PrintqArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub run: RunArgs,

    /// Print server to address instead of the local machine
    #[arg(long, value_name = "HOST")]
    pub computer: Option<String>,
}

// ============================================================================
// Network latency
// ============================================================================

#[derive(Args)]
pub struct NetlatArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub run: RunArgs,

    /// Number of echo requests per host
    #[arg(long, value_name = "N")]
    pub probes: Option<u32>,

    /// Log file to append measurements to
    #[arg(long, value_name = "PATH")]
    pub log: Option<String>,
}
