//! # medstore-core: Pure Business Logic for the Medstore Back-Office
//!
//! This crate holds every rule of the back-office that can be expressed
//! without touching the document store: the document shapes, integer money,
//! stock arithmetic, invoice arithmetic and dashboard aggregation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Medstore Back-Office Architecture                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/backoffice (services + CLI)                │   │
//! │  │   StockLedger ── InvoiceProcessor ── Dashboard ── Catalog       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ medstore-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │  stock  │ │ invoice │ │ report  │  │   │
//! │  │   │Medicine │ │  Money  │ │  plan   │ │ totals  │ │Dashboard│  │   │
//! │  │   │ Invoice │ │ (paise) │ │ adjust  │ │ status  │ │ Report  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  medstore-db (Document Store)                   │   │
//! │  │        DocumentStore trait, memory + SQLite, repositories       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Stored document shapes (Medicine, Invoice, lookups)
//! - [`money`] - Money type with integer arithmetic (paise)
//! - [`stock`] - Stock adjustment planning and history text
//! - [`invoice`] - Invoice totals and payment status derivation
//! - [`report`] - Dashboard aggregation
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use medstore_core::invoice::compute_totals;
//! use medstore_core::{LineItem, Money, PaymentStatus};
//!
//! let items = vec![LineItem::new("Paracetamol", Some("m1".into()), 3, Money::from_rupees(15))];
//! let totals = compute_totals(&items, Money::from_rupees(20));
//!
//! assert_eq!(totals.total, Money::from_rupees(45));
//! assert_eq!(totals.remaining, Money::from_rupees(25));
//! assert_eq!(totals.status, PaymentStatus::PartiallyPaid);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod invoice;
pub mod money;
pub mod report;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::DashboardReport;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Collection names in the document store.
///
/// These are the names the web back-office has always used; existing data
/// lives under them, so they must not change.
pub mod collections {
    pub const MEDICINE_INVENTORY: &str = "medicine_inventory";
    pub const INVOICES: &str = "invoices";
    pub const MEDICINE_TYPES: &str = "medicine_types";
    pub const MEDICINE_CATEGORIES: &str = "medicine_categories";
    /// Owned by the auth provider; listed so nothing else claims the name.
    pub const USERS: &str = "users";
}

/// A medicine with fewer units than this counts as low stock on the dashboard.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Longest medicine, type or category name accepted.
pub const MAX_NAME_LENGTH: usize = 200;
