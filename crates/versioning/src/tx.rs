//! Transaction completion shared by the coordinators.

use sqlx::{Postgres, Transaction};

use crate::error::{VersioningError, VersioningResult};

/// Commit `tx` when `result` is `Ok`, otherwise roll it back explicitly and
/// return the original error. A failed rollback is only logged.
pub(crate) async fn finish<T>(
    tx: Transaction<'_, Postgres>,
    result: VersioningResult<T>,
    operation: &'static str,
    on_commit_error: impl FnOnce(sqlx::Error) -> VersioningError,
) -> VersioningResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await.map_err(on_commit_error)?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(
                    operation,
                    error = %rollback_err,
                    "Transaction rollback failed"
                );
            }
            match &err {
                VersioningError::Core(_) => {
                    tracing::debug!(operation, error = %err, "Transaction rolled back")
                }
                _ => tracing::error!(
                    operation,
                    error = %err,
                    cause = ?std::error::Error::source(&err),
                    "Transaction rolled back"
                ),
            }
            Err(err)
        }
    }
}
