//! Database capability traits
//!
//! The migration engine only ever talks to a database through these traits.
//! Connection pooling, dialect handling and timeouts belong to the
//! implementation behind them.

use crate::error::DbResult;
use crate::value::SqlValue;

/// Statement execution shared by plain connections and open transactions.
pub trait Executor {
    /// Run a query and return a cursor over its rows.
    ///
    /// The caller owns the cursor and must `close` it on every exit path.
    fn raw_query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Box<dyn Cursor + '_>>;

    /// Execute a single statement, returning the number of affected rows.
    fn exec(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize>;

    /// Execute one or more `;`-separated statements without parameters.
    fn execute_batch(&self, sql: &str) -> DbResult<()>;
}

/// Forward-only row cursor returned by [`Executor::raw_query`].
pub trait Cursor {
    /// Advance to the next row. `Ok(None)` once the result set is exhausted.
    fn next_row(&mut self) -> DbResult<Option<Vec<SqlValue>>>;

    /// Release the result set. Calling `close` twice is a no-op.
    fn close(&mut self) -> DbResult<()>;
}

/// An open transaction.
///
/// `commit` and `rollback` consume the handle so it cannot outlive the unit
/// of work it was opened for.
pub trait Transaction: Executor {
    /// Commit all statements executed through this handle
    fn commit(self: Box<Self>) -> DbResult<()>;

    /// Discard all statements executed through this handle
    fn rollback(self: Box<Self>) -> DbResult<()>;
}

/// Database handle consumed by the migration engine.
pub trait Database: Executor + Send + Sync {
    /// Begin a new transaction
    fn begin(&self) -> DbResult<Box<dyn Transaction + '_>>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
