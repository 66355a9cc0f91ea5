//! # Validation Module
//!
//! Business rule validation for ElectroStock.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Validation Layers                             │
//! │                                                                     │
//! │  Layer 1: Renderer (JS)                                             │
//! │  ├── Basic format checks (empty, length)                            │
//! │  └── Immediate user feedback                                        │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: THIS MODULE (Rust)                                        │
//! │  ├── Re-derived totals, positive amounts, non-empty sales           │
//! │  └── The last checkpoint before a transaction opens                 │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database (SQLite)                                         │
//! │  ├── NOT NULL / UNIQUE / foreign key constraints                    │
//! │  └── Guarded stock decrements inside the sale transaction           │
//! │                                                                     │
//! │  Defense in depth: multiple layers catch different errors           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{NewPurchase, NewSale, NewSaleItem};
use crate::TOTAL_TOLERANCE;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required name field (product, category, client, supplier).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a free-text search query and returns it trimmed.
///
/// Empty queries are allowed; the query layer answers them with an empty
/// result set rather than a table scan.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a monetary amount that must be strictly positive.
pub fn validate_positive_amount(field: &str, amount: f64) -> ValidationResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a monetary amount that may be zero but not negative.
pub fn validate_non_negative_amount(field: &str, amount: f64) -> ValidationResult<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a report month (1-12).
pub fn validate_month(month: u32) -> ValidationResult<()> {
    if !(1..=12).contains(&(month as i64)) {
        return Err(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        });
    }

    Ok(())
}

// =============================================================================
// Sale Validation
// =============================================================================

/// Validates a sale header and its items before the transaction opens.
///
/// ## Checks
/// - at least one item
/// - every quantity strictly positive
/// - every unit price non-negative
/// - header total re-derived as subtotal + surcharge (within
///   [`TOTAL_TOLERANCE`]); mismatches are rejected, the engine never trusts
///   the renderer's arithmetic
pub fn validate_sale(sale: &NewSale, items: &[NewSaleItem]) -> CoreResult<()> {
    if items.is_empty() {
        return Err(CoreError::EmptySale);
    }

    for item in items {
        if item.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }
        validate_non_negative_amount("unit_price", item.unit_price)?;
    }

    validate_non_negative_amount("subtotal", sale.subtotal)?;
    validate_non_negative_amount("surcharge", sale.surcharge)?;

    if (sale.total - (sale.subtotal + sale.surcharge)).abs() > TOTAL_TOLERANCE {
        return Err(CoreError::TotalMismatch {
            subtotal: sale.subtotal,
            surcharge: sale.surcharge,
            total: sale.total,
        });
    }

    if sale.installments < 1 {
        return Err(ValidationError::OutOfRange {
            field: "installments".to_string(),
            min: 1,
            max: i64::MAX,
        }
        .into());
    }

    Ok(())
}

// =============================================================================
// Purchase Validation
// =============================================================================

/// Validates a purchase before insertion.
///
/// `paid_amount` may be zero (nothing paid yet) but never above the total:
/// the unpaid balance is not a cash event, and an over-paid purchase would
/// break the status derivation.
pub fn validate_purchase(purchase: &NewPurchase) -> CoreResult<()> {
    validate_name("description", &purchase.description)?;
    validate_positive_amount("total_amount", purchase.total_amount)?;
    validate_non_negative_amount("paid_amount", purchase.paid_amount)?;

    if purchase.paid_amount > purchase.total_amount {
        return Err(CoreError::PaidExceedsTotal {
            total: purchase.total_amount,
            paid: purchase.paid_amount,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Currency;

    fn sale(subtotal: f64, surcharge: f64, total: f64) -> NewSale {
        NewSale {
            payment_method: "cash_ars".into(),
            currency: Currency::Ars,
            subtotal,
            surcharge,
            total,
            installments: 1,
            customer_notes: None,
            warranty_enabled: false,
            warranty_months: 0.0,
            client_id: None,
        }
    }

    fn item(quantity: i64) -> NewSaleItem {
        NewSaleItem {
            product_id: 1,
            product_name: "USB-C 1m".into(),
            category_name: Some("Cables".into()),
            quantity,
            unit_price: 1500.0,
            subtotal: 1500.0 * quantity as f64,
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Cables").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_positive_amount("amount", 0.01).is_ok());
        assert!(validate_positive_amount("amount", 0.0).is_err());
        assert!(validate_positive_amount("amount", -5.0).is_err());
        assert!(validate_positive_amount("amount", f64::NAN).is_err());

        assert!(validate_non_negative_amount("amount", 0.0).is_ok());
        assert!(validate_non_negative_amount("amount", -0.01).is_err());
    }

    #[test]
    fn test_validate_sale_rejects_empty_items() {
        let err = validate_sale(&sale(100.0, 0.0, 100.0), &[]).unwrap_err();
        assert!(matches!(err, CoreError::EmptySale));
    }

    #[test]
    fn test_validate_sale_rederives_total() {
        // exact total passes
        assert!(validate_sale(&sale(1000.0, 150.0, 1150.0), &[item(1)]).is_ok());

        // off-by-one-peso total is rejected
        let err = validate_sale(&sale(1000.0, 150.0, 1151.0), &[item(1)]).unwrap_err();
        assert!(matches!(err, CoreError::TotalMismatch { .. }));
    }

    #[test]
    fn test_validate_sale_rejects_bad_quantity() {
        assert!(validate_sale(&sale(0.0, 0.0, 0.0), &[item(0)]).is_err());
        assert!(validate_sale(&sale(0.0, 0.0, 0.0), &[item(-2)]).is_err());
    }

    #[test]
    fn test_validate_purchase() {
        let mut p = NewPurchase {
            supplier_id: 1,
            description: "Stock replenishment".into(),
            total_amount: 10000.0,
            paid_amount: 4000.0,
            currency: Currency::Ars,
            payment_method: Some("cash_ars".into()),
            due_date: None,
            notes: None,
        };
        assert!(validate_purchase(&p).is_ok());

        p.paid_amount = 10001.0;
        assert!(matches!(
            validate_purchase(&p).unwrap_err(),
            CoreError::PaidExceedsTotal { .. }
        ));

        p.paid_amount = 0.0;
        assert!(validate_purchase(&p).is_ok());

        p.total_amount = 0.0;
        assert!(validate_purchase(&p).is_err());
    }

    #[test]
    fn test_validate_month() {
        assert!(validate_month(1).is_ok());
        assert!(validate_month(12).is_ok());
        assert!(validate_month(0).is_err());
        assert!(validate_month(13).is_err());
    }
}
