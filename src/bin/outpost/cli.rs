//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// outpost - detect and drive init systems and package managers
#[derive(Parser)]
#[command(name = "outpost")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Give up on target commands after this many seconds
    #[arg(long, global = true, value_name = "SECS", env = "OUTPOST_TIMEOUT")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the init system and package manager of this host
    Detect(DetectArgs),

    /// Manage a service through the detected init system
    Service(ServiceArgs),

    /// Manage packages through the detected package manager
    Package(PackageArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct DetectArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ServiceArgs {
    /// Operation to run
    #[arg(value_enum)]
    pub action: ServiceVerb,

    /// Service name
    pub name: String,

    /// Number of log lines for `logs`
    #[arg(short = 'n', long)]
    pub lines: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ServiceVerb {
    Start,
    Stop,
    Restart,
    Enable,
    Disable,
    Status,
    Logs,
    Path,
}

#[derive(Args)]
pub struct PackageArgs {
    /// Operation to run
    #[arg(value_enum)]
    pub action: PackageVerb,

    /// Package names
    pub names: Vec<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PackageVerb {
    Install,
    Remove,
    Update,
    Version,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
