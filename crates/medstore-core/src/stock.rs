//! # Stock Arithmetic
//!
//! Pure half of the stock ledger: decides whether an adjustment is allowed
//! and what it writes into the medicine's history. The ledger service in the
//! app reads the medicine, calls [`plan_adjustment`], then writes.
//!
//! ```text
//! current ──► plan_adjustment(current, delta) ──► StockPlan { new_stock }
//!                     │
//!                     ├── delta == 0           → ValidationError::MustBeNonZero
//!                     └── current + delta < 0  → CoreError::InsufficientStock
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::MAX_QUANTITY;

// =============================================================================
// Stock Reason
// =============================================================================

/// Why a stock level moved. Drives the history text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockReason {
    /// Manual addition from the inventory screen.
    Restock,
    /// Consumption by an invoice.
    Sale { customer: String },
    /// Manual fix after a count, in either direction.
    Correction { note: String },
}

impl StockReason {
    pub fn sale_to(customer: impl Into<String>) -> Self {
        StockReason::Sale {
            customer: customer.into(),
        }
    }

    /// Human-readable history line for a movement of `delta` units.
    pub fn describe(&self, medicine: &str, delta: i64) -> String {
        let units = delta.abs();
        match self {
            StockReason::Restock => {
                format!("Added {} more items of {} to stock", units, medicine)
            }
            StockReason::Sale { customer } => {
                format!("Sold {} items of {} (sale to {})", units, medicine, customer)
            }
            StockReason::Correction { note } if delta < 0 => {
                format!("Removed {} items of {} from stock ({})", units, medicine, note)
            }
            StockReason::Correction { note } => {
                format!("Added {} items of {} to stock ({})", units, medicine, note)
            }
        }
    }
}

// =============================================================================
// Catalog History Text
// =============================================================================

pub fn added_to_inventory(medicine: &str, stock: i64) -> String {
    format!("Added {} to inventory with {} items", medicine, stock)
}

pub fn updated_details(medicine: &str) -> String {
    format!("Updated details of {}", medicine)
}

pub fn deleted_from_inventory(medicine: &str) -> String {
    format!("Deleted {} from inventory", medicine)
}

// =============================================================================
// Adjustment Planning
// =============================================================================

/// Outcome of a permitted adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockPlan {
    pub previous: i64,
    pub delta: i64,
    pub new_stock: i64,
}

/// Checks `current + delta` against the no-negative-stock rule.
///
/// ## Errors
/// - `Validation(MustBeNonZero)` when `delta` is 0
/// - `Validation(OutOfRange)` when `|delta|` exceeds [`MAX_QUANTITY`]
/// - `InsufficientStock` when the result would be negative; `requested`
///   carries the units asked for
///
/// ## Example
/// ```rust
/// use medstore_core::stock::plan_adjustment;
///
/// let plan = plan_adjustment("Paracetamol", 5, -3).unwrap();
/// assert_eq!(plan.new_stock, 2);
/// assert!(plan_adjustment("Paracetamol", 5, -6).is_err());
/// ```
pub fn plan_adjustment(medicine: &str, current: i64, delta: i64) -> CoreResult<StockPlan> {
    if delta == 0 {
        return Err(ValidationError::MustBeNonZero {
            field: "delta".to_string(),
        }
        .into());
    }

    if delta.abs() > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "delta".to_string(),
            min: -MAX_QUANTITY,
            max: MAX_QUANTITY,
        }
        .into());
    }

    // Stored stock is not validated, so the sum may still overflow
    let new_stock = current.checked_add(delta).ok_or_else(|| ValidationError::OutOfRange {
        field: "stock".to_string(),
        min: 0,
        max: i64::MAX,
    })?;
    if new_stock < 0 {
        return Err(CoreError::InsufficientStock {
            medicine: medicine.to_string(),
            available: current,
            requested: -delta,
        });
    }

    Ok(StockPlan {
        previous: current,
        delta,
        new_stock,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
