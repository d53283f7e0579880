//! Migration script model

use std::fmt;

/// Direction a script is applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// The up/down statement pair for one version.
///
/// Either side may hold several `;`-separated statements. Scripts are
/// immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    up: String,
    down: String,
    using_transaction: bool,
}

impl Script {
    /// A script executed directly against the database, outside a transaction
    pub fn new(up: impl Into<String>, down: impl Into<String>) -> Self {
        Self {
            up: up.into(),
            down: down.into(),
            using_transaction: false,
        }
    }

    /// A script whose statement and version bookkeeping share one transaction
    pub fn transactional(up: impl Into<String>, down: impl Into<String>) -> Self {
        Self {
            using_transaction: true,
            ..Self::new(up, down)
        }
    }

    pub fn up(&self) -> &str {
        &self.up
    }

    pub fn down(&self) -> &str {
        &self.down
    }

    pub fn using_transaction(&self) -> bool {
        self.using_transaction
    }

    /// Statement text for `direction`, or `None` when it is blank.
    pub fn statement(&self, direction: Direction) -> Option<&str> {
        let sql = match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        };
        if sql.trim().is_empty() {
            None
        } else {
            Some(sql)
        }
    }
}
