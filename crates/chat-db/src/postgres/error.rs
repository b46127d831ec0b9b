//! Error handling utilities for repositories

use chat_core::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub(crate) fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::Database(e.to_string())
}

/// Map a unique violation to a business error, anything else to a database error
pub(crate) fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    map_db_error(e)
}

/// Fail when an UPDATE/DELETE matched nothing
pub(crate) fn ensure_affected(rows: u64, missing: impl FnOnce() -> DomainError) -> Result<(), DomainError> {
    if rows == 0 {
        Err(missing())
    } else {
        Ok(())
    }
}
