//! Configuration types and parsing for migrate.yml

use crate::error::{MigrateError, MigrateResult};
use crate::registry::Registry;
use crate::script::Script;
use crate::store::{VersionStore, DEFAULT_TABLE};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Config file names looked up by [`Config::load_from_dir`], in order
pub const CONFIG_FILE_NAMES: &[&str] = &["migrate.yml", "migrate.yaml"];

/// Main configuration from migrate.yml
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Version-store table name
    #[serde(default = "default_table")]
    pub table: String,

    /// Scripts keyed by version
    #[serde(default)]
    pub migrations: BTreeMap<i64, ScriptConfig>,
}

/// Database connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Path to the DuckDB file, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// One script entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptConfig {
    /// Forward statement(s)
    pub up: String,

    /// Reverse statement(s)
    #[serde(default)]
    pub down: String,

    /// Run the script and its bookkeeping in one transaction
    #[serde(default)]
    pub transaction: bool,
}

impl From<&ScriptConfig> for Script {
    fn from(cfg: &ScriptConfig) -> Self {
        if cfg.transaction {
            Script::transactional(cfg.up.clone(), cfg.down.clone())
        } else {
            Script::new(cfg.up.clone(), cfg.down.clone())
        }
    }
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_db_path() -> String {
    ":memory:".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> MigrateResult<Self> {
        if !path.exists() {
            return Err(MigrateError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| MigrateError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_yaml(&content)?;
        log::debug!(
            "Loaded {} with {} migration(s)",
            path.display(),
            config.migrations.len()
        );
        Ok(config)
    }

    /// Load configuration from a directory containing migrate.yml or migrate.yaml
    pub fn load_from_dir(dir: &Path) -> MigrateResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }
        Err(MigrateError::ConfigNotFound {
            path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    /// Parse and validate configuration text
    pub fn from_yaml(content: &str) -> MigrateResult<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Build the registry described by `migrations`
    pub fn registry(&self) -> MigrateResult<Registry> {
        Registry::new(
            self.migrations
                .iter()
                .map(|(version, cfg)| (*version, Script::from(cfg))),
        )
    }

    fn validate(&self) -> MigrateResult<()> {
        VersionStore::new(self.table.clone())?;
        if self.database.path.trim().is_empty() {
            return Err(MigrateError::ConfigError {
                message: "database.path cannot be empty".to_string(),
            });
        }
        self.registry()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
