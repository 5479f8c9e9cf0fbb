//! # Validation Module
//!
//! Input checks run before a record reaches storage.
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::{validate_barcode, validate_page_size};
//!
//! assert!(validate_barcode("890-1234").is_ok());
//! assert!(validate_page_size(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{Person, Product};
use crate::{MAX_PAGE_SIZE, MAX_SEARCH_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product or counterparty name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a barcode: 1 to 20 of `[0-9A-Za-z-]`.
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 20,
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters, digits, and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates a phone number: optional leading `+`, then 7 to 15 digits.
pub fn validate_contact_number(number: &str) -> ValidationResult<()> {
    let digits = number.strip_prefix('+').unwrap_or(number);

    if digits.is_empty() {
        return Err(ValidationError::Required {
            field: "contact_number".to_string(),
        });
    }

    if !digits.chars().all(|c| c.is_ascii_digit()) || !(7..=15).contains(&digits.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "contact_number".to_string(),
            reason: "expected 7 to 15 digits".to_string(),
        });
    }

    Ok(())
}

/// Trims a search query and bounds its length.
///
/// ## Returns
/// The trimmed query. Empty means no search filter.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LENGTH {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_LENGTH,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// A price in cents may be zero but never negative.
pub fn validate_price(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Line quantities on a new document must be positive.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

pub fn validate_page_size(page_size: u32) -> ValidationResult<()> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ValidationError::OutOfRange {
            field: "page_size".to_string(),
            min: 1,
            max: MAX_PAGE_SIZE as i64,
        });
    }
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Checks a product before it is written to the catalog.
///
/// Stock is not checked: it may legitimately be negative.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_name("name", &product.name)?;
    if let Some(barcode) = product.barcode.as_deref().filter(|b| !b.is_empty()) {
        validate_barcode(barcode)?;
    }
    validate_price("cost_price", product.cost_price_cents)?;
    validate_price("purchase_price", product.purchase_price_cents)?;
    validate_price("mrp", product.mrp_cents)?;
    validate_price("wholesale_price", product.wholesale_price_cents)?;
    validate_price("dealer_price", product.dealer_price_cents)?;
    Ok(())
}

/// Checks a customer or supplier before it is saved.
pub fn validate_person<P: Person>(person: &P) -> ValidationResult<()> {
    validate_name("name", person.name())?;
    if !person.contact_number().is_empty() {
        validate_contact_number(person.contact_number())?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
