//! Version registry: the fixed set of scripts keyed by version.

use crate::error::{MigrateError, MigrateResult};
use crate::script::Script;
use std::collections::BTreeMap;

/// Mapping from version to [`Script`], built once and never mutated.
///
/// Versions are strictly positive; `0` is reserved to mean "nothing applied".
/// They need not be contiguous.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    scripts: BTreeMap<i64, Script>,
}

impl Registry {
    /// Build a registry, rejecting duplicate or non-positive versions.
    pub fn new(scripts: impl IntoIterator<Item = (i64, Script)>) -> MigrateResult<Self> {
        let mut map = BTreeMap::new();
        for (version, script) in scripts {
            if version <= 0 {
                return Err(MigrateError::ConfigError {
                    message: format!("migration version {version} must be greater than zero"),
                });
            }
            if map.insert(version, script).is_some() {
                return Err(MigrateError::ConfigError {
                    message: format!("migration version {version} is defined more than once"),
                });
            }
        }
        Ok(Self { scripts: map })
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    pub fn get(&self, version: i64) -> Option<&Script> {
        self.scripts.get(&version)
    }

    /// All versions in ascending order.
    pub fn versions(&self) -> Vec<i64> {
        let mut keys: Vec<i64> = self.scripts.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Highest registered version
    pub fn latest(&self) -> Option<i64> {
        self.versions().last().copied()
    }

    /// Versions still to apply after `last`, ascending.
    ///
    /// With nothing applied (`None`) every version is pending. Returns `None`
    /// when `last` is not a registered version, since resuming from an
    /// unknown point cannot be done deterministically.
    pub fn pending_after(&self, last: Option<i64>) -> Option<Vec<i64>> {
        let versions = self.versions();
        match last {
            None => Some(versions),
            Some(last) => {
                let pos = versions.iter().position(|v| *v == last)?;
                Some(versions[pos + 1..].to_vec())
            }
        }
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
