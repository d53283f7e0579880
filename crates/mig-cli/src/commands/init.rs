//! Init command implementation

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common::build_migrator;

/// Execute the init command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let migrator = build_migrator(global)?;
    let table = migrator.store().table().to_string();

    if migrator.initialize()? {
        println!("Created version table '{table}'");
    } else {
        println!("Version table '{table}' already exists");
    }
    Ok(())
}
