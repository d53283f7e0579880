//! Transaction runner

use crate::error::{MigrateError, MigrateResult};
use crate::phase::Phase;
use mig_db::{Database, Transaction};

/// Execute `body` within a transaction, committing on success and rolling
/// back on error.
///
/// `body` only borrows the transaction, so it cannot keep the handle past its
/// own return. A rollback that itself fails is reported as
/// [`MigrateError::RollbackError`] carrying the original error.
pub fn with_transaction<T, F>(db: &dyn Database, phase: Phase, body: F) -> MigrateResult<T>
where
    F: FnOnce(&dyn Transaction) -> MigrateResult<T>,
{
    let tx = db
        .begin()
        .map_err(|e| MigrateError::execution(phase, "begin transaction", e))?;

    match body(&*tx) {
        Ok(value) => {
            tx.commit()
                .map_err(|e| MigrateError::execution(phase, "commit transaction", e))?;
            Ok(value)
        }
        Err(err) => {
            log::debug!(target: phase.target(), "rolling back: {err}");
            if let Err(source) = tx.rollback() {
                return Err(MigrateError::RollbackError {
                    phase,
                    cause: Box::new(err),
                    source,
                });
            }
            Err(err)
        }
    }
}
