//! Error types for mig-core

use crate::phase::Phase;
use crate::script::Direction;
use mig_db::DbError;
use thiserror::Error;

/// Migration engine errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// MG001: Missing or invalid engine configuration
    #[error("[MG001] Invalid migrator configuration: {message}")]
    ConfigError { message: String },

    /// MG002: Version-store table is absent
    #[error("[MG002] Migration table '{table}' not found; run initialize first")]
    SchemaError {
        table: String,
        #[source]
        source: DbError,
    },

    /// MG003: Script has no statement for the requested direction
    #[error("[MG003] {phase}: migration script {version} has an empty {direction} statement")]
    ScriptError {
        phase: Phase,
        version: i64,
        direction: Direction,
    },

    /// MG004: The database rejected a statement, cursor, or transaction call
    #[error("[MG004] {phase}: {step} failed")]
    ExecutionError {
        phase: Phase,
        step: String,
        #[source]
        source: DbError,
    },

    /// MG005: Rolling back after a failed unit of work also failed
    #[error("[MG005] {phase}: rollback failed after error: {cause}")]
    RollbackError {
        phase: Phase,
        cause: Box<MigrateError>,
        #[source]
        source: DbError,
    },

    /// MG006: Stored versions disagree with the registry
    #[error("[MG006] Migration check failed: {message}")]
    ConsistencyError { message: String },

    /// MG007: Stored version is not defined in the registry
    #[error("[MG007] {phase}: applied version {version} is not defined in the registry")]
    UnknownVersion { phase: Phase, version: i64 },

    /// MG008: Configuration file not found
    #[error("[MG008] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// MG009: Failed to parse configuration file
    #[error("[MG009] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// MG010: IO error with file path context
    #[error("[MG010] IO error at {path}: {source}")]
    IoWithPath {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;

impl From<serde_yaml::Error> for MigrateError {
    fn from(err: serde_yaml::Error) -> Self {
        MigrateError::ConfigParseError {
            message: err.to_string(),
        }
    }
}

impl MigrateError {
    /// Wrap a driver error raised while running `step` during `phase`.
    pub(crate) fn execution(phase: Phase, step: impl Into<String>, source: DbError) -> Self {
        MigrateError::ExecutionError {
            phase,
            step: step.into(),
            source,
        }
    }
}
