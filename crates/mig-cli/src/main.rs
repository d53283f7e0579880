//! mig CLI - versioned schema migrations for DuckDB

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::{check, down, init, status, truncate, up};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match &cli.command {
        cli::Commands::Init => init::execute(&cli.global),
        cli::Commands::Up => up::execute(&cli.global),
        cli::Commands::Down => down::execute(&cli.global),
        cli::Commands::Check => check::execute(&cli.global),
        cli::Commands::Truncate(args) => truncate::execute(args, &cli.global),
        cli::Commands::Status(args) => status::execute(args, &cli.global),
    }
}
