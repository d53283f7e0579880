//! Version store: the table of applied versions.
//!
//! One row per applied version in a single `version BIGINT` column. All reads
//! and writes go through an [`Executor`], so the same calls work on a plain
//! connection and inside a transaction.

use crate::error::{MigrateError, MigrateResult};
use crate::phase::Phase;
use mig_db::{Cursor, DbError, DbResult, Executor, SqlValue};

/// Default version-store table name
pub const DEFAULT_TABLE: &str = "migrations";

/// Name of the single version column
pub const VERSION_COLUMN: &str = "version";

/// Closes the wrapped cursor when dropped.
///
/// A failed close is logged and otherwise ignored; it never changes the
/// outcome of the operation that opened the cursor.
struct CursorGuard<'a> {
    cursor: Box<dyn Cursor + 'a>,
    phase: Phase,
}

impl<'a> CursorGuard<'a> {
    fn new(cursor: Box<dyn Cursor + 'a>, phase: Phase) -> Self {
        Self { cursor, phase }
    }

    fn next_row(&mut self) -> DbResult<Option<Vec<SqlValue>>> {
        self.cursor.next_row()
    }
}

impl Drop for CursorGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.cursor.close() {
            log::error!(target: self.phase.target(), "failed to close cursor: {e}");
        }
    }
}

/// Handle to the version-store table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionStore {
    table: String,
}

impl Default for VersionStore {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl VersionStore {
    /// Use `table` as the version store. Accepts `name` or `schema.name`.
    pub fn new(table: impl Into<String>) -> MigrateResult<Self> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self { table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Schema part of a qualified table name.
    pub fn schema(&self) -> Option<&str> {
        self.table.split_once('.').map(|(schema, _)| schema)
    }

    /// Probe the table with a lightweight query.
    fn probe<E: Executor + ?Sized>(&self, exec: &E, phase: Phase) -> DbResult<()> {
        let cursor = exec.raw_query(&format!("SELECT 1 FROM {} LIMIT 1", self.table), &[])?;
        drop(CursorGuard::new(cursor, phase));
        Ok(())
    }

    /// Whether the table can be queried. Any probe failure counts as absent.
    pub fn exists<E: Executor + ?Sized>(&self, exec: &E, phase: Phase) -> bool {
        match self.probe(exec, phase) {
            Ok(()) => true,
            Err(e) => {
                log::debug!(target: phase.target(), "table {} probe failed: {e}", self.table);
                false
            }
        }
    }

    /// Fail with [`MigrateError::SchemaError`] unless the table exists.
    pub fn ensure_exists<E: Executor + ?Sized>(&self, exec: &E, phase: Phase) -> MigrateResult<()> {
        self.probe(exec, phase).map_err(|source| MigrateError::SchemaError {
            table: self.table.clone(),
            source,
        })
    }

    /// Highest stored version, or `None` when the table is empty.
    pub fn latest<E: Executor + ?Sized>(
        &self,
        exec: &E,
        phase: Phase,
    ) -> MigrateResult<Option<i64>> {
        let sql = format!(
            "SELECT {col} FROM {table} ORDER BY {col} DESC LIMIT 1",
            col = VERSION_COLUMN,
            table = self.table
        );
        let step = "read latest applied version";
        let cursor = exec
            .raw_query(&sql, &[])
            .map_err(|e| MigrateError::execution(phase, step, e))?;
        let mut rows = CursorGuard::new(cursor, phase);

        match rows.next_row() {
            Ok(Some(row)) => scan_version(&row)
                .map(Some)
                .map_err(|e| MigrateError::execution(phase, step, e)),
            Ok(None) => Ok(None),
            Err(e) => Err(MigrateError::execution(phase, step, e)),
        }
    }

    /// Every stored version, ascending.
    ///
    /// A row that cannot be read as an integer version is a
    /// [`MigrateError::ConsistencyError`].
    pub fn applied<E: Executor + ?Sized>(
        &self,
        exec: &E,
        phase: Phase,
    ) -> MigrateResult<Vec<i64>> {
        let sql = format!(
            "SELECT {col} FROM {table} ORDER BY {col}",
            col = VERSION_COLUMN,
            table = self.table
        );
        let cursor = exec
            .raw_query(&sql, &[])
            .map_err(|e| MigrateError::execution(phase, "read applied versions", e))?;
        let mut rows = CursorGuard::new(cursor, phase);

        let mut versions = Vec::new();
        loop {
            let row = rows.next_row().and_then(|row| match row {
                Some(row) => scan_version(&row).map(Some),
                None => Ok(None),
            });
            match row {
                Ok(Some(version)) => versions.push(version),
                Ok(None) => break,
                Err(e) => {
                    return Err(MigrateError::ConsistencyError {
                        message: format!("failed to scan {VERSION_COLUMN} column: {e}"),
                    })
                }
            }
        }
        Ok(versions)
    }

    /// Append a row for `version`.
    pub fn record<E: Executor + ?Sized>(
        &self,
        exec: &E,
        phase: Phase,
        version: i64,
    ) -> MigrateResult<()> {
        exec.exec(
            &format!("INSERT INTO {} ({VERSION_COLUMN}) VALUES (?)", self.table),
            &[SqlValue::Integer(version)],
        )
        .map_err(|e| MigrateError::execution(phase, format!("record version {version}"), e))?;
        Ok(())
    }

    /// Delete every row with version >= `version`, returning the count.
    pub fn remove_from<E: Executor + ?Sized>(
        &self,
        exec: &E,
        phase: Phase,
        version: i64,
    ) -> MigrateResult<usize> {
        exec.exec(
            &format!("DELETE FROM {} WHERE {VERSION_COLUMN} >= ?", self.table),
            &[SqlValue::Integer(version)],
        )
        .map_err(|e| MigrateError::execution(phase, format!("remove versions >= {version}"), e))
    }

    /// Create the table, and its schema when the name is qualified. Fails if
    /// the table already exists.
    pub fn create<E: Executor + ?Sized>(&self, exec: &E, phase: Phase) -> MigrateResult<()> {
        if let Some(schema) = self.schema() {
            exec.exec(&format!("CREATE SCHEMA IF NOT EXISTS {schema}"), &[])
                .map_err(|e| {
                    MigrateError::execution(phase, format!("create schema {schema}"), e)
                })?;
        }
        exec.exec(
            &format!("CREATE TABLE {} ({VERSION_COLUMN} BIGINT NOT NULL)", self.table),
            &[],
        )
        .map_err(|e| MigrateError::execution(phase, format!("create table {}", self.table), e))?;
        Ok(())
    }

    /// Delete every row.
    pub fn clear<E: Executor + ?Sized>(&self, exec: &E, phase: Phase) -> MigrateResult<()> {
        exec.exec(&format!("DELETE FROM {}", self.table), &[])
            .map_err(|e| {
                MigrateError::execution(phase, format!("truncate table {}", self.table), e)
            })?;
        Ok(())
    }
}

fn scan_version(row: &[SqlValue]) -> DbResult<i64> {
    match row.first() {
        Some(value) => value.as_i64().ok_or_else(|| {
            DbError::CursorError(format!("{VERSION_COLUMN} is not an integer: {value}"))
        }),
        None => Err(DbError::CursorError("row has no columns".to_string())),
    }
}

/// Table names are interpolated into SQL, so only plain identifiers are
/// accepted, optionally schema-qualified.
fn validate_table_name(name: &str) -> MigrateResult<()> {
    let valid_part = |part: &str| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 || !parts.iter().all(|p| valid_part(p)) {
        return Err(MigrateError::ConfigError {
            message: format!(
                "invalid table name '{name}': expected an identifier such as 'migrations' or 'meta.migrations'"
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
