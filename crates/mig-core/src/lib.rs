//! mig-core - Versioned schema migrations
//!
//! This crate provides the script model, the version registry, the persisted
//! version store, and the [`Migrator`] engine that applies, reverts and checks
//! migrations through the `mig-db` capability traits.
//!
//! The engine assumes a single writer: running `up` or `down` from several
//! processes against the same database at once is not coordinated here.

pub mod config;
pub mod engine;
pub mod error;
pub mod phase;
pub mod registry;
pub mod script;
pub mod store;
pub mod transaction;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use engine::{Migrator, MigratorBuilder, VersionStatus};
pub use error::{MigrateError, MigrateResult};
pub use phase::Phase;
pub use registry::Registry;
pub use script::{Direction, Script};
pub use store::{VersionStore, DEFAULT_TABLE};
