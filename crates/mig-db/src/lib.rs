//! mig-db - Database capability layer for mig
//!
//! This crate provides the `Database`, `Transaction`, `Executor` and `Cursor`
//! traits consumed by the migration engine, plus a DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;
pub mod value;

pub use crate::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{Cursor, Database, Executor, Transaction};
pub use value::{RowBuffer, SqlValue};
