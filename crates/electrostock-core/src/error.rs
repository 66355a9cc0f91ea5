//! # Error Types
//!
//! Domain-specific error types for electrostock-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Error Types                                │
//! │                                                                     │
//! │  electrostock-core errors (this file)                               │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  electrostock-db errors (separate crate)                            │
//! │  └── DbError          - Database operation failures                 │
//! │                                                                     │
//! │  Boundary errors (electrostock-api)                                 │
//! │  └── ApiError         - What the renderer sees (serialized)         │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → renderer  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, amounts, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are raised before or
/// inside a transactional unit; a unit that raises one commits nothing.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A sale arrived with no line items.
    #[error("Sale must contain at least one item")]
    EmptySale,

    /// The sale header's total does not equal subtotal + surcharge.
    ///
    /// The renderer computes the total, but the engine is the last
    /// checkpoint: it re-derives the sum and rejects mismatches.
    #[error("Sale total {total} does not match subtotal {subtotal} + surcharge {surcharge}")]
    TotalMismatch {
        subtotal: f64,
        surcharge: f64,
        total: f64,
    },

    /// Insufficient stock to complete a sale.
    ///
    /// ## When This Occurs
    /// The guarded decrement inside `create_sale` found fewer units on hand
    /// than the line item requests. The whole sale rolls back.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// A payment exceeds the balance it is meant to settle.
    ///
    /// Raised for purchase payments above the pending balance and for client
    /// account payments above the client's current debt. Rejected before any
    /// row is written.
    #[error("Payment of {requested} exceeds outstanding balance of {outstanding}")]
    PaymentExceedsBalance { outstanding: f64, requested: f64 },

    /// A purchase was recorded with paid_amount above total_amount.
    #[error("Paid amount {paid} exceeds purchase total {total}")]
    PaidExceedsTotal { total: f64, paid: f64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Used for early
/// validation before any business logic or database write runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., unknown currency label, bad import mode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: 7,
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 7: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        assert_eq!(err.to_string(), "amount must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
