//! Down command implementation

use anyhow::Result;

use crate::cli::GlobalArgs;
use crate::commands::common::build_migrator;

/// Execute the down command
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let migrator = build_migrator(global)?;
    match migrator.down()? {
        Some(version) => println!("Reverted: {version}"),
        None => println!("Nothing to revert"),
    }
    Ok(())
}
