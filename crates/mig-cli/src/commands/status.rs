//! Status command implementation

use anyhow::Result;
use mig_core::VersionStatus;

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::build_migrator;

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let migrator = build_migrator(global)?;
    let statuses = migrator.status()?;

    match args.output {
        StatusOutput::Json => println!("{}", serde_json::to_string_pretty(&statuses)?),
        StatusOutput::Table => print!("{}", format_table(&statuses)),
    }
    Ok(())
}

fn format_table(statuses: &[VersionStatus]) -> String {
    if statuses.is_empty() {
        return "No migrations defined\n".to_string();
    }

    let width = statuses
        .iter()
        .map(|s| s.version.to_string().len())
        .max()
        .unwrap_or(0)
        .max("VERSION".len());

    let mut out = format!("{:>width$}  STATUS\n", "VERSION");
    for status in statuses {
        let label = if status.applied { "applied" } else { "pending" };
        out.push_str(&format!("{:>width$}  {label}\n", status.version));
    }
    let pending = statuses.iter().filter(|s| !s.applied).count();
    out.push_str(&format!("\n{} total, {pending} pending\n", statuses.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_aligns_versions() {
        let out = format_table(&[
            VersionStatus {
                version: 1,
                applied: true,
            },
            VersionStatus {
                version: 20240101,
                applied: false,
            },
        ]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], " VERSION  STATUS");
        assert_eq!(lines[1], "       1  applied");
        assert_eq!(lines[2], "20240101  pending");
        assert_eq!(lines[4], "2 total, 1 pending");
    }

    #[test]
    fn empty_table() {
        assert_eq!(format_table(&[]), "No migrations defined\n");
    }
}
