//! # Error Types
//!
//! Failures that can be decided without storage.
//!
//! ```text
//! ValidationError ──► CoreError ──► DbError (stockroom-db) ──► caller
//!   bad field value     cannot build     not found, commit,
//!                       a document       mapping failures
//! ```
//!
//! Not-found lives in `DbError`: only storage can tell.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// A document could not be assembled or a value was rejected.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Save pressed with nothing in the builder.
    #[error("No products selected")]
    EmptySelection,

    /// A sale needs a customer, a purchase needs a supplier.
    #[error("No {role} selected")]
    MissingCounterparty { role: &'static str },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// One rejected field. `field` is the snake_case field name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Required { field: String },

    #[error("{field} exceeds {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must lie within {min}..={max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be greater than zero")]
    MustBePositive { field: String },

    /// Wrong characters or shape (barcode, phone number).
    #[error("{field} is malformed: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_messages() {
        assert_eq!(CoreError::EmptySelection.to_string(), "No products selected");
        assert_eq!(
            CoreError::MissingCounterparty { role: "supplier" }.to_string(),
            "No supplier selected"
        );
    }

    #[test]
    fn test_validation_passes_through_unchanged() {
        let err = ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 20,
        };
        assert_eq!(err.field(), "barcode");

        let core: CoreError = err.clone().into();
        assert_eq!(core.to_string(), "barcode exceeds 20 characters");
        assert!(matches!(core, CoreError::Validation(inner) if inner == err));
    }
}
