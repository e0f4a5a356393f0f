//! # Error Types
//!
//! Domain-specific error types for medstore-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  medstore-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  medstore-db errors (separate crate)                                   │
//! │  └── DbError          - Document store failures                        │
//! │                                                                         │
//! │  backoffice errors (app)                                               │
//! │  ├── BackofficeError  - Validation / InsufficientStock / NotFound /    │
//! │  │                      StoreUnavailable                               │
//! │  └── ApiError         - The transient notification the user sees      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → BackofficeError → ApiError        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Medicine cannot be found.
    ///
    /// ## When This Occurs
    /// - A stock adjustment names a medicine id that was never created
    /// - The medicine was deleted between listing and adjusting it
    #[error("Medicine not found: {0}")]
    MedicineNotFound(String),

    /// Invoice cannot be found.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// Insufficient stock to complete a deduction.
    ///
    /// ## When This Occurs
    /// - An invoice line asks for more units than the medicine has on hand
    /// - A manual correction would take stock below zero
    ///
    /// ## User Workflow
    /// ```text
    /// Create invoice (Paracetamol × 6)
    ///      │
    ///      ▼
    /// Check stock: available=5
    ///      │
    ///      ▼
    /// InsufficientStock { medicine: "Paracetamol", available: 5, requested: 6 }
    ///      │
    ///      ▼
    /// Notification: "Insufficient stock for Paracetamol: available 5, requested 6"
    /// ```
    #[error("Insufficient stock for {medicine}: available {available}, requested {requested}")]
    InsufficientStock {
        medicine: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any document is written, so a validation failure never
/// leaves partial state behind.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be zero (a zero stock delta changes nothing).
    #[error("{field} must not be zero")]
    MustBeNonZero { field: String },

    /// Invalid format (e.g., unknown payment status text).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
