//! Migration engine
//!
//! [`Migrator`] applies pending scripts in ascending version order, reverts
//! the latest applied version, and checks that the store matches the
//! registry. All state lives in the database; the engine itself only holds
//! the handle, the registry, and the version-store table name.
//!
//! Each operation reads the stored versions once and treats them as a
//! snapshot, so only one process may migrate a given database at a time.

use crate::error::{MigrateError, MigrateResult};
use crate::phase::Phase;
use crate::registry::Registry;
use crate::script::{Direction, Script};
use crate::store::VersionStore;
use crate::transaction::with_transaction;
use mig_db::{Database, Executor};
use serde::Serialize;
use std::sync::Arc;

/// Whether one registry version has a row in the version store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionStatus {
    pub version: i64,
    pub applied: bool,
}

/// Builder for [`Migrator`].
#[derive(Default)]
pub struct MigratorBuilder {
    db: Option<Arc<dyn Database>>,
    registry: Registry,
    table: Option<String>,
}

impl MigratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Database handle to migrate. Required.
    pub fn database(mut self, db: Arc<dyn Database>) -> Self {
        self.db = Some(db);
        self
    }

    /// Scripts to apply. Defaults to an empty registry.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Version-store table name. Defaults to `migrations`.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn build(self) -> MigrateResult<Migrator> {
        let db = self.db.ok_or_else(|| MigrateError::ConfigError {
            message: "a database handle is required".to_string(),
        })?;
        let store = match self.table {
            Some(table) => VersionStore::new(table)?,
            None => VersionStore::default(),
        };
        Ok(Migrator {
            db,
            registry: self.registry,
            store,
        })
    }
}

/// Versioned migration engine.
pub struct Migrator {
    db: Arc<dyn Database>,
    registry: Registry,
    store: VersionStore,
}

impl Migrator {
    pub fn builder() -> MigratorBuilder {
        MigratorBuilder::new()
    }

    /// Engine over `registry` using the default `migrations` table
    pub fn new(db: Arc<dyn Database>, registry: Registry) -> Self {
        Self {
            db,
            registry,
            store: VersionStore::default(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    /// Apply every pending version in ascending order.
    ///
    /// Returns the versions applied by this call. Stops at the first failure;
    /// versions committed earlier in the same call stay applied, so calling
    /// `up` again after fixing the cause resumes where it stopped.
    pub fn up(&self) -> MigrateResult<Vec<i64>> {
        let phase = Phase::Up;
        let db = self.db.as_ref();
        self.store.ensure_exists(db, phase)?;

        let Some(target) = self.registry.latest() else {
            log::info!(target: phase.target(), "migration script is empty, nothing to migrate");
            return Ok(Vec::new());
        };

        let last = self.store.latest(db, phase)?;
        if last == Some(target) {
            log::info!(target: phase.target(), "migration already up to date at version {target}");
            return Ok(Vec::new());
        }

        let pending = match self.registry.pending_after(last) {
            Some(pending) => pending,
            None => {
                return Err(MigrateError::UnknownVersion {
                    phase,
                    version: last.unwrap_or_default(),
                })
            }
        };

        let mut applied = Vec::with_capacity(pending.len());
        for version in pending {
            let script = self.script(phase, version)?;
            let sql = script
                .statement(Direction::Up)
                .ok_or(MigrateError::ScriptError {
                    phase,
                    version,
                    direction: Direction::Up,
                })?;

            log::info!(target: phase.target(), "executing migration version {version}");
            if let Err(e) = self.apply(script, Direction::Up, version, sql) {
                log::error!(
                    target: phase.target(),
                    "failed to execute migration script {version}: {e}"
                );
                return Err(e);
            }
            log::info!(target: phase.target(), "migration with version {version} migrated");
            applied.push(version);
        }
        Ok(applied)
    }

    /// Revert the most recently applied version.
    ///
    /// Bookkeeping deletes every stored row with a version greater than or
    /// equal to the reverted one, which also clears rows left above it by a
    /// partial apply. Returns the reverted version, or `None` when nothing is
    /// applied.
    pub fn down(&self) -> MigrateResult<Option<i64>> {
        let phase = Phase::Down;
        let db = self.db.as_ref();
        self.store.ensure_exists(db, phase)?;

        if self.registry.is_empty() {
            log::info!(target: phase.target(), "migration script is empty, nothing to revert");
            return Ok(None);
        }

        let Some(version) = self.store.latest(db, phase)? else {
            let table = self.store.table();
            log::info!(target: phase.target(), "{table} table is empty, nothing to do");
            return Ok(None);
        };

        let script = self.script(phase, version)?;
        let sql = script
            .statement(Direction::Down)
            .ok_or(MigrateError::ScriptError {
                phase,
                version,
                direction: Direction::Down,
            })?;

        log::info!(target: phase.target(), "begin down migration {version} version");
        if let Err(e) = self.apply(script, Direction::Down, version, sql) {
            log::error!(
                target: phase.target(),
                "failed to execute migration down script {version}: {e}"
            );
            return Err(e);
        }
        log::info!(target: phase.target(), "migration version {version} reverted");
        Ok(Some(version))
    }

    /// Verify that the highest registry version has a stored row.
    pub fn check(&self) -> MigrateResult<()> {
        let phase = Phase::Check;
        let db = self.db.as_ref();
        self.store.ensure_exists(db, phase)?;

        let Some(target) = self.registry.latest() else {
            log::info!(target: phase.target(), "migration script is empty, nothing to check");
            return Ok(());
        };

        let applied = self.store.applied(db, phase)?;
        if applied.is_empty() {
            return Err(MigrateError::ConsistencyError {
                message: format!(
                    "migration {target} is not migrated: {} table is empty",
                    self.store.table()
                ),
            });
        }
        if !applied.contains(&target) {
            return Err(MigrateError::ConsistencyError {
                message: format!("migration {target} is not migrated"),
            });
        }

        log::info!(target: phase.target(), "migrations up to date at version {target}");
        Ok(())
    }

    /// Remove every stored version row. The table must exist.
    pub fn truncate(&self) -> MigrateResult<()> {
        let phase = Phase::Truncate;
        let db = self.db.as_ref();
        self.store.ensure_exists(db, phase)?;
        self.store.clear(db, phase)?;
        log::info!(target: phase.target(), "{} table truncated", self.store.table());
        Ok(())
    }

    /// Create the version-store table unless it already exists.
    ///
    /// Returns whether the table was created.
    pub fn initialize(&self) -> MigrateResult<bool> {
        let phase = Phase::Initialize;
        let db = self.db.as_ref();
        let table = self.store.table();
        if self.store.exists(db, phase) {
            log::info!(target: phase.target(), "{table} table already exists, nothing to do");
            return Ok(false);
        }

        if let Err(e) = with_transaction(db, phase, |tx| self.store.create(tx, phase)) {
            log::error!(target: phase.target(), "failed to initialize {table} table: {e}");
            return Err(e);
        }
        log::info!(target: phase.target(), "{table} table created");
        Ok(true)
    }

    /// Every registry version, ascending, with whether it has a stored row.
    pub fn status(&self) -> MigrateResult<Vec<VersionStatus>> {
        let phase = Phase::Status;
        let db = self.db.as_ref();
        self.store.ensure_exists(db, phase)?;

        let applied = self.store.applied(db, phase)?;
        Ok(self
            .registry
            .versions()
            .into_iter()
            .map(|version| VersionStatus {
                version,
                applied: applied.binary_search(&version).is_ok(),
            })
            .collect())
    }

    fn script(&self, phase: Phase, version: i64) -> MigrateResult<&Script> {
        self.registry
            .get(version)
            .ok_or(MigrateError::UnknownVersion { phase, version })
    }

    /// Run one script and its bookkeeping, inside a transaction when the
    /// script asks for one.
    ///
    /// Without a transaction the statement is not undone if bookkeeping fails
    /// afterwards; the version row is then missing until reconciled by hand.
    fn apply(
        &self,
        script: &Script,
        direction: Direction,
        version: i64,
        sql: &str,
    ) -> MigrateResult<()> {
        let phase = phase_for(direction);
        let db = self.db.as_ref();

        if script.using_transaction() {
            return with_transaction(db, phase, |tx| {
                run_script(tx, direction, version, sql)?;
                self.bookkeep(tx, direction, version)
            });
        }

        run_script(db, direction, version, sql)?;
        self.bookkeep(db, direction, version).inspect_err(|_| {
            log::warn!(
                target: phase.target(),
                "version {version} {direction} script was executed but the {} table \
                 was not updated; reconcile it before running again",
                self.store.table()
            );
        })
    }

    fn bookkeep<E: Executor + ?Sized>(
        &self,
        exec: &E,
        direction: Direction,
        version: i64,
    ) -> MigrateResult<()> {
        let phase = phase_for(direction);
        match direction {
            Direction::Up => self.store.record(exec, phase, version),
            Direction::Down => {
                let removed = self.store.remove_from(exec, phase, version)?;
                log::debug!(
                    target: phase.target(),
                    "removed {removed} version row(s) >= {version}"
                );
                Ok(())
            }
        }
    }
}

fn phase_for(direction: Direction) -> Phase {
    match direction {
        Direction::Up => Phase::Up,
        Direction::Down => Phase::Down,
    }
}

fn run_script<E: Executor + ?Sized>(
    exec: &E,
    direction: Direction,
    version: i64,
    sql: &str,
) -> MigrateResult<()> {
    exec.execute_batch(sql).map_err(|e| {
        MigrateError::execution(
            phase_for(direction),
            format!("version {version} {direction} script"),
            e,
        )
    })
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
