//! Check command implementation

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use crate::commands::common::build_migrator;

/// Execute the check command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let migrator = build_migrator(global)?;
    migrator.check().context("Database is not fully migrated")?;

    match migrator.registry().latest() {
        Some(version) => println!("Up to date at version {version}"),
        None => println!("No migrations defined"),
    }
    Ok(())
}
