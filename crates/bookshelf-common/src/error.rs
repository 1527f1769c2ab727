//! Error types shared across Bookshelf crates

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, CommonError>;

/// Errors raised by shared types and helpers
#[derive(Error, Debug, PartialEq)]
pub enum CommonError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),
}
