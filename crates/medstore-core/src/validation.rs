//! # Validation Module
//!
//! Input validation for the back-office.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI forms                                                     │
//! │  └── Immediate feedback (empty fields)                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Services (Rust)                                              │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: business rule validation, before any write           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Document store                                               │
//! │  └── Schemaless: nothing is enforced here                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is schemaless, so layer 2 is the last line of defence.

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{LineItem, Party};
use crate::MAX_NAME_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Most units a single stock movement or invoice line may carry.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Highest unit price accepted on input (₹1 crore).
///
/// `MAX_PRICE × MAX_QUANTITY` stays far inside the i64 paise range, so line
/// totals built from validated input cannot overflow.
pub const MAX_PRICE: Money = Money::from_rupees(10_000_000);

// =============================================================================
// String Validators
// =============================================================================

/// Validates a name field (medicine, type, category, party).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use medstore_core::validation::validate_name;
///
/// assert!(validate_name("name", "Paracetamol").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a lookup entry name, e.g. "Medicine Type name is required".
pub fn validate_lookup_name(label: &str, name: &str) -> ValidationResult<()> {
    validate_name(&format!("{} name", label), name)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity that must be at least one.
pub fn validate_quantity(field: &str, quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if quantity > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock level held at rest (zero allowed).
pub fn validate_stock_level(stock: i64) -> ValidationResult<()> {
    if !(0..=MAX_QUANTITY).contains(&stock) {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: MAX_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a price (zero allowed for free samples).
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() || price > MAX_PRICE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE.rupees(),
        });
    }
    Ok(())
}

/// Validates a payment amount being recorded against an invoice.
pub fn validate_payment_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Invoice Validators
// =============================================================================

/// Validates seller or buyer details. Only the name is mandatory.
pub fn validate_party(field: &str, party: &Party) -> ValidationResult<()> {
    validate_name(&format!("{} name", field), &party.name)
}

/// Validates one invoice line.
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    validate_name("medicine name", &item.name)?;
    validate_quantity("quantity", item.quantity)?;
    validate_price("price", item.price)?;

    if let Some(id) = &item.medicine_id {
        if id.trim().is_empty() {
            return Err(ValidationError::InvalidFormat {
                field: "medicineId".to_string(),
                reason: "must not be blank when present".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Amoxicillin").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", &"x".repeat(201)).is_err());
    }

    #[test]
    fn test_lookup_name_message() {
        let err = validate_lookup_name("Medicine Type", " ").unwrap_err();
        assert_eq!(err.to_string(), "Medicine Type name is required");
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("quantity", 1).is_ok());
        assert!(matches!(
            validate_quantity("quantity", 0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(validate_quantity("quantity", -3).is_err());
        assert!(validate_quantity("quantity", MAX_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("price", Money::zero()).is_ok());
        assert!(validate_price("price", Money::from_paise(-1)).is_err());
        assert!(validate_price("price", MAX_PRICE).is_ok());
        assert!(matches!(
            validate_price("price", MAX_PRICE + Money::from_paise(1)),
            Err(ValidationError::OutOfRange { max: 10_000_000, .. })
        ));
    }

    #[test]
    fn test_largest_valid_line_fits() {
        let line = LineItem::new("Insulin", None, MAX_QUANTITY, MAX_PRICE);
        assert!(validate_line_item(&line).is_ok());
        assert!(MAX_PRICE.checked_multiply_quantity(MAX_QUANTITY).is_some());

        let oversized = LineItem::new("Insulin", None, 3, Money::from_paise(i64::MAX / 2));
        assert!(validate_line_item(&oversized).is_err());
    }

    #[test]
    fn test_validate_line_item() {
        let ok = LineItem::new("Paracetamol", Some("m1".into()), 2, Money::from_rupees(15));
        assert!(validate_line_item(&ok).is_ok());

        let no_name = LineItem::new("", None, 2, Money::from_rupees(15));
        assert!(validate_line_item(&no_name).is_err());

        let blank_ref = LineItem::new("Paracetamol", Some("  ".into()), 2, Money::from_rupees(15));
        assert!(matches!(
            validate_line_item(&blank_ref),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_validate_party() {
        let err = validate_party("buyer", &Party::default()).unwrap_err();
        assert_eq!(err.to_string(), "buyer name is required");
    }
}
