//! Shared validation utilities
//!
//! Text inputs are trimmed before they are checked. Lengths are counted in
//! characters, and exceeding a limit is an error rather than a truncation.
//!
//! ```rust,ignore
//! let title = validate_required_text("title", command.title.as_deref(), 100)?;
//! let description = validate_optional_text("description", command.description.as_deref(), 500)?;
//! ```

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at most {max_length} characters")]
    TooLong {
        field: &'static str,
        max_length: usize,
    },

    #[error("{field} is invalid: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl FieldValidationError {
    /// Name of the offending input
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field } | Self::TooLong { field, .. } | Self::Invalid { field, .. } => {
                field
            }
        }
    }
}

/// Trim and bound a required text field
pub fn validate_required_text(
    field: &'static str,
    value: Option<&str>,
    max_length: usize,
) -> Result<String, FieldValidationError> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(FieldValidationError::Required { field });
    }
    check_length(field, trimmed, max_length)?;
    Ok(trimmed.to_string())
}

/// Trim and bound an optional text field; blank becomes `None`
pub fn validate_optional_text(
    field: &'static str,
    value: Option<&str>,
    max_length: usize,
) -> Result<Option<String>, FieldValidationError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(trimmed) => {
            check_length(field, trimmed, max_length)?;
            Ok(Some(trimmed.to_string()))
        }
        None => Ok(None),
    }
}

/// Minimal structural email check; returns the trimmed, lowercased address
pub fn validate_email(value: Option<&str>) -> Result<String, FieldValidationError> {
    let email = validate_required_text("email", value, 254)?.to_lowercase();

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(FieldValidationError::Invalid {
            field: "email",
            reason: "not a valid email address",
        })
    }
}

fn check_length(
    field: &'static str,
    value: &str,
    max_length: usize,
) -> Result<(), FieldValidationError> {
    if value.chars().count() > max_length {
        return Err(FieldValidationError::TooLong { field, max_length });
    }
    Ok(())
}
