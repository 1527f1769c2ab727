//! Shared utilities and types for feature modules
//!
//! - **pagination**: page parameters and totals
//! - **validation**: text and email validation
//! - **error_helpers**: database error handling utilities
//! - **test_helpers**: fakes and fixtures (test-only)

pub mod error_helpers;
pub mod pagination;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;

pub use pagination::{PageParams, PageSummary, PaginationError};
pub use validation::{
    validate_email, validate_optional_text, validate_required_text, FieldValidationError,
};
