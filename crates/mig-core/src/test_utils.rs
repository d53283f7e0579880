//! Shared test utilities for mig-core
//!
//! [`FakeDb`] understands exactly the statements the version store issues and
//! records everything else as opaque script batches. Failures can be injected
//! per statement substring, on cursor close, commit, and rollback.

use mig_db::{Cursor, Database, DbError, DbResult, Executor, SqlValue, Transaction};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub table_exists: bool,
    /// Committed version rows, in insertion order
    pub versions: Vec<i64>,
    /// Committed script batches, in execution order
    pub scripts: Vec<String>,
    /// Every statement received, committed or not
    pub statements: Vec<String>,
    /// Statements containing any of these substrings fail
    pub fail_matching: Vec<String>,
    /// Inserting this version fails
    pub fail_insert_version: Option<i64>,
    pub fail_close: bool,
    pub fail_commit: bool,
    pub fail_rollback: bool,
    /// Return version cells as text instead of integers
    pub corrupt_rows: bool,
    pub cursors_opened: usize,
    pub cursors_closed: usize,
    pub commits: usize,
    pub rollbacks: usize,
}

impl FakeState {
    /// Number of statements that modify data or schema
    pub fn writes(&self) -> usize {
        self.statements
            .iter()
            .filter(|s| !s.starts_with("SELECT") && *s != "BEGIN")
            .count()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Script(String),
    Insert(i64),
    DeleteFrom(i64),
    Create,
    CreateSchema,
    Clear,
}

pub(crate) struct FakeDb {
    state: Mutex<FakeState>,
}

impl FakeDb {
    /// Database without a version table
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
        }
    }

    /// Database with a version table holding `versions`
    pub fn with_versions(versions: &[i64]) -> Self {
        let db = Self::new();
        {
            let mut state = db.state();
            state.table_exists = true;
            state.versions = versions.to_vec();
        }
        db
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    /// Record `sql` and fail if it matches an injected pattern.
    fn receive(&self, sql: &str) -> DbResult<()> {
        let mut state = self.state();
        state.statements.push(sql.to_string());
        if state.fail_matching.iter().any(|p| sql.contains(p.as_str())) {
            return Err(DbError::ExecutionError(format!("injected failure: {sql}")));
        }
        Ok(())
    }

    fn classify(&self, sql: &str, params: &[SqlValue]) -> DbResult<Op> {
        let version = || {
            params
                .first()
                .and_then(SqlValue::as_i64)
                .ok_or_else(|| DbError::ExecutionError(format!("missing version param: {sql}")))
        };
        let op = if sql.starts_with("INSERT INTO") {
            Op::Insert(version()?)
        } else if sql.starts_with("DELETE FROM") && sql.contains(">=") {
            Op::DeleteFrom(version()?)
        } else if sql.starts_with("DELETE FROM") {
            Op::Clear
        } else if sql.starts_with("CREATE TABLE") {
            Op::Create
        } else if sql.starts_with("CREATE SCHEMA") {
            Op::CreateSchema
        } else {
            return Err(DbError::ExecutionError(format!("unexpected exec: {sql}")));
        };
        let state = self.state();
        if !matches!(op, Op::Create | Op::CreateSchema) && !state.table_exists {
            return Err(DbError::TableNotFound(sql.to_string()));
        }
        if let Op::Insert(v) = op {
            if state.fail_insert_version == Some(v) {
                return Err(DbError::ExecutionError(format!("injected insert failure for {v}")));
            }
        }
        Ok(op)
    }

    fn apply(&self, op: Op) {
        let mut state = self.state();
        match op {
            Op::Script(sql) => state.scripts.push(sql),
            Op::Insert(v) => state.versions.push(v),
            Op::DeleteFrom(v) => state.versions.retain(|stored| *stored < v),
            Op::Create => state.table_exists = true,
            Op::CreateSchema => {}
            Op::Clear => state.versions.clear(),
        }
    }
}

impl Executor for FakeDb {
    fn raw_query(&self, sql: &str, _params: &[SqlValue]) -> DbResult<Box<dyn Cursor + '_>> {
        self.receive(sql)?;
        let mut state = self.state();
        if !state.table_exists {
            return Err(DbError::TableNotFound(sql.to_string()));
        }

        let mut sorted = state.versions.clone();
        sorted.sort_unstable();
        let cell = |v: i64| {
            if state.corrupt_rows {
                SqlValue::Text(format!("v{v}"))
            } else {
                SqlValue::Integer(v)
            }
        };
        let rows: VecDeque<Vec<SqlValue>> = if sql.starts_with("SELECT 1") {
            sorted.iter().take(1).map(|_| vec![SqlValue::Integer(1)]).collect()
        } else if sql.contains("DESC LIMIT 1") {
            sorted.last().map(|v| vec![cell(*v)]).into_iter().collect()
        } else {
            sorted.iter().map(|v| vec![cell(*v)]).collect()
        };

        state.cursors_opened += 1;
        Ok(Box::new(FakeCursor {
            db: self,
            rows,
            closed: false,
        }))
    }

    fn exec(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        self.receive(sql)?;
        let op = self.classify(sql, params)?;
        self.apply(op);
        Ok(1)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.receive(sql)?;
        self.apply(Op::Script(sql.to_string()));
        Ok(())
    }
}

impl Database for FakeDb {
    fn begin(&self) -> DbResult<Box<dyn Transaction + '_>> {
        self.receive("BEGIN")?;
        Ok(Box::new(FakeTx {
            db: self,
            staged: RefCell::new(Vec::new()),
        }))
    }

    fn db_type(&self) -> &'static str {
        "fake"
    }
}

struct FakeCursor<'a> {
    db: &'a FakeDb,
    rows: VecDeque<Vec<SqlValue>>,
    closed: bool,
}

impl Cursor for FakeCursor<'_> {
    fn next_row(&mut self) -> DbResult<Option<Vec<SqlValue>>> {
        Ok(self.rows.pop_front())
    }

    fn close(&mut self) -> DbResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let mut state = self.db.state();
        state.cursors_closed += 1;
        if state.fail_close {
            return Err(DbError::CursorError("injected close failure".to_string()));
        }
        Ok(())
    }
}

/// Stages writes until commit.
struct FakeTx<'a> {
    db: &'a FakeDb,
    staged: RefCell<Vec<Op>>,
}

impl Executor for FakeTx<'_> {
    fn raw_query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Box<dyn Cursor + '_>> {
        self.db.raw_query(sql, params)
    }

    fn exec(&self, sql: &str, params: &[SqlValue]) -> DbResult<usize> {
        self.db.receive(sql)?;
        let op = self.db.classify(sql, params)?;
        self.staged.borrow_mut().push(op);
        Ok(1)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.db.receive(sql)?;
        self.staged.borrow_mut().push(Op::Script(sql.to_string()));
        Ok(())
    }
}

impl Transaction for FakeTx<'_> {
    fn commit(self: Box<Self>) -> DbResult<()> {
        if self.db.state().fail_commit {
            return Err(DbError::TransactionError("injected commit failure".to_string()));
        }
        let FakeTx { db, staged } = *self;
        for op in staged.into_inner() {
            db.apply(op);
        }
        db.state().commits += 1;
        Ok(())
    }

    fn rollback(self: Box<Self>) -> DbResult<()> {
        let mut state = self.db.state();
        state.rollbacks += 1;
        if state.fail_rollback {
            return Err(DbError::TransactionError("injected rollback failure".to_string()));
        }
        Ok(())
    }
}
