//! Driver-neutral cell values and an owned row cursor.

use crate::error::{DbError, DbResult};
use crate::traits::Cursor;
use std::collections::VecDeque;
use std::fmt;

/// A single SQL value, used both as a bound parameter and as a result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Double(f64),
    Text(String),
    Boolean(bool),
}

impl SqlValue {
    /// Integer view of the value, if it holds one
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("null"),
            SqlValue::Integer(n) => write!(f, "{n}"),
            SqlValue::Double(x) => write!(f, "{x}"),
            SqlValue::Text(s) => f.write_str(s),
            SqlValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// Cursor over rows that were fully read at query time.
#[derive(Debug, Default)]
pub struct RowBuffer {
    rows: VecDeque<Vec<SqlValue>>,
    closed: bool,
}

impl RowBuffer {
    /// Wrap already-collected rows
    pub fn new(rows: Vec<Vec<SqlValue>>) -> Self {
        Self {
            rows: rows.into(),
            closed: false,
        }
    }
}

impl Cursor for RowBuffer {
    fn next_row(&mut self) -> DbResult<Option<Vec<SqlValue>>> {
        if self.closed {
            return Err(DbError::CursorError("read from closed cursor".to_string()));
        }
        Ok(self.rows.pop_front())
    }

    fn close(&mut self) -> DbResult<()> {
        self.closed = true;
        self.rows.clear();
        Ok(())
    }
}
