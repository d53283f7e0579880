//! Shared setup for commands: config loading and engine construction

use anyhow::{Context, Result};
use mig_core::{Config, Migrator};
use mig_db::{Database, DuckDbBackend};
use std::path::Path;
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Load config from `--config` or from migrate.yml in the project directory
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    match &global.config {
        Some(path) => {
            Config::load(Path::new(path)).context("Failed to load configuration file")
        }
        None => Config::load_from_dir(Path::new(&global.project_dir))
            .context("Failed to load migration configuration"),
    }
}

/// Open the database and build a migrator from the loaded config
pub(crate) fn build_migrator(global: &GlobalArgs) -> Result<Migrator> {
    let config = load_config(global)?;
    build_migrator_from(&config, global.database.as_deref())
}

/// Build a migrator from `config`, with `db_override` taking precedence over
/// `database.path`
pub(crate) fn build_migrator_from(config: &Config, db_override: Option<&str>) -> Result<Migrator> {
    let db_path = db_override.unwrap_or(&config.database.path);
    let db: Arc<dyn Database> =
        Arc::new(DuckDbBackend::new(db_path).context("Failed to connect to database")?);
    log::debug!("Connected to {} database at {}", db.db_type(), db_path);

    let registry = config.registry().context("Invalid migration registry")?;
    Migrator::builder()
        .database(db)
        .registry(registry)
        .table(config.table.clone())
        .build()
        .context("Failed to build migrator")
}
