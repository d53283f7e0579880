//! Truncate command implementation

use anyhow::{bail, Result};

use crate::cli::{GlobalArgs, TruncateArgs};
use crate::commands::common::build_migrator;

/// Execute the truncate command
pub(crate) fn execute(args: &TruncateArgs, global: &GlobalArgs) -> Result<()> {
    if !args.yes {
        bail!("truncate clears all recorded versions; re-run with --yes to confirm");
    }

    let migrator = build_migrator(global)?;
    migrator.truncate()?;
    println!("Cleared version table '{}'", migrator.store().table());
    Ok(())
}
