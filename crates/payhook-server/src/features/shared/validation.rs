//! Shared validation utilities
//!
//! Field-level validation for command inputs. Each function returns a
//! [`FieldValidationError`] naming the offending field so commands can
//! surface it directly to the caller.

use thiserror::Error;

/// Errors that can occur during field validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldValidationError {
    #[error("{field} is required and cannot be empty")]
    Required { field: &'static str },

    #[error("{field} must be between 1 and {max_length} characters")]
    TooLong {
        field: &'static str,
        max_length: usize,
    },

    #[error("{field} must be a 3-letter ISO currency code")]
    InvalidCurrency { field: &'static str },
}

/// Validate a required free-text field
///
/// # Rules
/// - Must not be empty (after trimming whitespace)
/// - Must not exceed max_length characters
pub fn validate_required(
    value: &str,
    field: &'static str,
    max_length: usize,
) -> Result<(), FieldValidationError> {
    if value.trim().is_empty() {
        return Err(FieldValidationError::Required { field });
    }
    if value.len() > max_length {
        return Err(FieldValidationError::TooLong { field, max_length });
    }
    Ok(())
}

/// Validate a 3-letter ISO 4217 currency code
pub fn validate_currency(value: &str, field: &'static str) -> Result<(), FieldValidationError> {
    if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FieldValidationError::InvalidCurrency { field });
    }
    Ok(())
}
