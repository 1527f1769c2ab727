//! Database error handling utilities
//!
//! ```rust,ignore
//! sqlx::query(...)
//!     .execute(&pool)
//!     .await
//!     .map_err(|e| map_unique_violation(e, RegisterAdminError::DuplicateEmail(email), Into::into))?;
//! ```

use sqlx::Error as SqlxError;

/// Check if the error is a unique constraint violation
pub fn is_unique_violation(error: &SqlxError) -> bool {
    if let SqlxError::Database(db_err) = error {
        return db_err.is_unique_violation();
    }
    false
}

/// Return `unique_error` on a unique violation, otherwise wrap the original error
pub fn map_unique_violation<E, F>(error: SqlxError, unique_error: E, default_wrapper: F) -> E
where
    F: FnOnce(SqlxError) -> E,
{
    if is_unique_violation(&error) {
        unique_error
    } else {
        default_wrapper(error)
    }
}
