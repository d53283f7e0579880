//! Engine phases, used as log targets and error context.

use std::fmt;

/// The engine operation a log record or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Up,
    Down,
    Check,
    Truncate,
    Initialize,
    Status,
}

impl Phase {
    /// Log target for records emitted during this phase
    pub fn target(self) -> &'static str {
        match self {
            Phase::Up => "mig::up",
            Phase::Down => "mig::down",
            Phase::Check => "mig::check",
            Phase::Truncate => "mig::truncate",
            Phase::Initialize => "mig::initialize",
            Phase::Status => "mig::status",
        }
    }

    /// Short uppercase label
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Up => "MIGRATION-UP",
            Phase::Down => "MIGRATION-DOWN",
            Phase::Check => "MIGRATION-CHECK",
            Phase::Truncate => "MIGRATION-TRUNCATE",
            Phase::Initialize => "MIGRATION-INIT",
            Phase::Status => "MIGRATION-STATUS",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
