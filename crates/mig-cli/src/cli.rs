//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// mig - apply, revert, and check versioned schema migrations
#[derive(Parser, Debug)]
#[command(name = "mig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory containing migrate.yml
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override database path (":memory:" for an in-memory database)
    #[arg(short, long, global = true, env = "MIG_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the version table if it does not exist
    Init,

    /// Apply all pending migrations in version order
    Up,

    /// Revert the most recently applied migration
    Down,

    /// Fail unless the latest migration has been applied
    Check,

    /// Remove every row from the version table
    Truncate(TruncateArgs),

    /// List migrations and whether each has been applied
    Status(StatusArgs),
}

/// Arguments for the truncate command
#[derive(Args, Debug)]
pub struct TruncateArgs {
    /// Confirm clearing the version table
    #[arg(long)]
    pub yes: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Aligned text table
    Table,
    /// JSON array
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
