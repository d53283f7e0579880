//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{Cursor, Database, Executor, Transaction};
use crate::value::{RowBuffer, SqlValue};
use duckdb::types::{ToSql, ToSqlOutput, Value};
use duckdb::{params_from_iter, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Check if a table or view exists in the catalog
    pub fn relation_exists(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;

        let (schema, table) = match name.rfind('.') {
            Some(pos) => (&name[..pos], &name[pos + 1..]),
            None => ("main", name),
        };

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            duckdb::params![schema, table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }
}

impl Executor for DuckDbBackend {
    fn raw_query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Box<dyn Cursor + '_>> {
        let conn = self.lock()?;
        Ok(Box::new(query_rows(&conn, sql, params)?))
    }

    fn exec(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        let conn = self.lock()?;
        exec_statement(&conn, sql, params)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql).map_err(DbError::from)
    }
}

impl Database for DuckDbBackend {
    fn begin(&self) -> DbResult<Box<dyn Transaction + '_>> {
        let conn = self.lock()?;
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;
        Ok(Box::new(DuckDbTransaction {
            conn,
            finished: false,
        }))
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

/// Transaction holding the connection lock until commit or rollback.
///
/// Dropping an unfinished transaction rolls it back.
pub struct DuckDbTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl Executor for DuckDbTransaction<'_> {
    fn raw_query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Box<dyn Cursor + '_>> {
        Ok(Box::new(query_rows(&self.conn, sql, params)?))
    }

    fn exec(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        exec_statement(&self.conn, sql, params)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.conn.execute_batch(sql).map_err(DbError::from)
    }
}

impl Transaction for DuckDbTransaction<'_> {
    fn commit(mut self: Box<Self>) -> DbResult<()> {
        self.finished = true;
        if let Err(commit_err) = self.conn.execute_batch("COMMIT") {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                log::warn!("Failed to roll back after COMMIT error: {e}");
            }
            return Err(DbError::TransactionError(format!(
                "COMMIT failed: {commit_err}"
            )));
        }
        Ok(())
    }

    fn rollback(mut self: Box<Self>) -> DbResult<()> {
        self.finished = true;
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| DbError::TransactionError(format!("ROLLBACK failed: {e}")))
    }
}

impl Drop for DuckDbTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                log::warn!("Failed to roll back abandoned transaction: {e}");
            }
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        let value = match self {
            SqlValue::Null => Value::Null,
            SqlValue::Integer(n) => Value::BigInt(*n),
            SqlValue::Double(x) => Value::Double(*x),
            SqlValue::Text(s) => Value::Text(s.clone()),
            SqlValue::Boolean(b) => Value::Boolean(*b),
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

fn exec_statement(conn: &Connection, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
    conn.execute(sql, params_from_iter(params.iter()))
        .map_err(|e| DbError::from(e).with_statement(sql))
}

/// Run `sql` and read every row into an owned buffer.
///
/// DuckDB panics on `column_count()` before execution, so the count is taken
/// from each row inside `query_map`.
fn query_rows(conn: &Connection, sql: &str, params: &[SqlValue]) -> DbResult<RowBuffer> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), |row| {
            let col_count = row.as_ref().column_count();
            (0..col_count)
                .map(|i| read_cell(row, i))
                .collect::<duckdb::Result<Vec<_>>>()
        })?
        .collect::<Result<Vec<Vec<SqlValue>>, _>>()
        .map_err(|e| DbError::CursorError(format!("row error: {e}")))?;
    Ok(RowBuffer::new(rows))
}

/// Narrow a DuckDB cell to a [`SqlValue`].
///
/// Types without a direct counterpart (decimals, timestamps, lists) are
/// carried as their debug text.
fn read_cell(row: &duckdb::Row<'_>, idx: usize) -> duckdb::Result<SqlValue> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Boolean(b) => SqlValue::Boolean(b),
        Value::TinyInt(n) => SqlValue::Integer(n.into()),
        Value::SmallInt(n) => SqlValue::Integer(n.into()),
        Value::Int(n) => SqlValue::Integer(n.into()),
        Value::BigInt(n) => SqlValue::Integer(n),
        Value::UTinyInt(n) => SqlValue::Integer(n.into()),
        Value::USmallInt(n) => SqlValue::Integer(n.into()),
        Value::UInt(n) => SqlValue::Integer(n.into()),
        Value::UBigInt(n) => match i64::try_from(n) {
            Ok(n) => SqlValue::Integer(n),
            Err(_) => SqlValue::Text(n.to_string()),
        },
        Value::HugeInt(n) => match i64::try_from(n) {
            Ok(n) => SqlValue::Integer(n),
            Err(_) => SqlValue::Text(n.to_string()),
        },
        Value::Float(x) => SqlValue::Double(x.into()),
        Value::Double(x) => SqlValue::Double(x),
        Value::Text(s) => SqlValue::Text(s),
        other => SqlValue::Text(format!("{other:?}")),
    })
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
