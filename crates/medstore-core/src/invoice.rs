//! # Invoice Arithmetic
//!
//! Totals, remaining balance and payment status for an invoice.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line items ──► total = Σ quantity × price                             │
//! │                   │                                                     │
//! │  paid ────────────┼──► remaining = total − paid                         │
//! │                   │                                                     │
//! │                   └──► status:  paid ≥ total      → Paid               │
//! │                                 0 < paid < total  → Partially Paid     │
//! │                                 otherwise         → Pending            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `Paid` test comes first, so an empty cart with nothing paid is `Paid`.

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::types::{LineItem, PaymentStatus};

/// Derived money fields of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub total: Money,
    pub paid: Money,
    pub remaining: Money,
    pub status: PaymentStatus,
}

/// Σ quantity × price over all lines. Zero for an empty cart.
pub fn invoice_total(items: &[LineItem]) -> Money {
    items.iter().map(LineItem::line_total).sum()
}

/// Status implied by the amounts.
///
/// Nothing paid is always `Pending`, even for a zero-total invoice.
pub fn derive_payment_status(total: Money, paid: Money) -> PaymentStatus {
    if !paid.is_positive() {
        PaymentStatus::Pending
    } else if paid >= total {
        PaymentStatus::Paid
    } else {
        PaymentStatus::PartiallyPaid
    }
}

/// Computes every derived field for a new invoice.
pub fn compute_totals(items: &[LineItem], paid: Money) -> InvoiceTotals {
    let total = invoice_total(items);
    InvoiceTotals {
        total,
        paid,
        remaining: total - paid,
        status: derive_payment_status(total, paid),
    }
}

/// Recomputes the derived fields after `amount` more has been paid.
pub fn apply_payment(total: Money, already_paid: Money, amount: Money) -> InvoiceTotals {
    let paid = already_paid + amount;
    InvoiceTotals {
        total,
        paid,
        remaining: total - paid,
        status: derive_payment_status(total, paid),
    }
}

/// Audit note stored on each line as `sellHistory`.
pub fn sell_annotation(item: &LineItem, customer: &str, at: DateTime<Utc>) -> String {
    format!(
        "Sold {} x {} at {} each to {} on {}",
        item.quantity,
        item.name,
        item.price,
        customer,
        at.to_rfc3339()
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
