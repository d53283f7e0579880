//! Up command implementation

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common::build_migrator;

/// Execute the up command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let migrator = build_migrator(global)?;
    let applied = migrator.up()?;

    if applied.is_empty() {
        println!("Already up to date");
        return Ok(());
    }

    for version in &applied {
        println!("  Applied: {version}");
    }
    println!(
        "\nApplied {} migration{}",
        applied.len(),
        if applied.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
