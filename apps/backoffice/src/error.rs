//! # Back-Office Error Types
//!
//! The four failures a user can see, and the notification they see.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Back-Office                        │
//! │                                                                         │
//! │  ValidationError ───────────────┐                                       │
//! │  CoreError::InsufficientStock ──┤                                       │
//! │  DbError::NotFound ─────────────┼──► BackofficeError ──► ApiError      │
//! │  DbError::Unavailable / other ──┘         │                 │           │
//! │                                           │                 ▼           │
//! │                              services return it    transient message   │
//! │                                                     shown once, no retry│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store failures are logged with their real cause where they are converted;
//! the user gets a generic message.

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use medstore_core::{CoreError, ValidationError};
use medstore_db::DbError;

// =============================================================================
// Service Error
// =============================================================================

/// Error returned by every back-office service.
#[derive(Debug, Error)]
pub enum BackofficeError {
    /// Input rejected before anything was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A deduction would take a medicine below zero.
    ///
    /// ## When This Occurs
    /// - An invoice line asks for more than is on hand. Earlier lines of the
    ///   same invoice have already been deducted and stay deducted.
    #[error("Insufficient stock for {medicine}: available {available}, requested {requested}")]
    InsufficientStock {
        medicine: String,
        available: i64,
        requested: i64,
    },

    /// A referenced document does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The store failed or could not be reached. Never retried.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl BackofficeError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        BackofficeError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<CoreError> for BackofficeError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MedicineNotFound(id) => BackofficeError::not_found("Medicine", id),
            CoreError::InvoiceNotFound(id) => BackofficeError::not_found("Invoice", id),
            CoreError::InsufficientStock {
                medicine,
                available,
                requested,
            } => BackofficeError::InsufficientStock {
                medicine,
                available,
                requested,
            },
            CoreError::Validation(e) => BackofficeError::Validation(e),
        }
    }
}

impl From<DbError> for BackofficeError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { collection, id } => {
                BackofficeError::not_found(entity_name(&collection), id)
            }
            other => {
                error!(error = %other, "Store operation failed");
                BackofficeError::StoreUnavailable(other.to_string())
            }
        }
    }
}

/// "medicine_inventory" → "Medicine", for messages.
fn entity_name(collection: &str) -> &str {
    use medstore_core::collections::*;
    match collection {
        MEDICINE_INVENTORY => "Medicine",
        INVOICES => "Invoice",
        MEDICINE_TYPES => "Medicine Type",
        MEDICINE_CATEGORIES => "Medicine Category",
        other => other,
    }
}

/// Convenience type alias for service results.
pub type BackofficeResult<T> = Result<T, BackofficeError>;

// =============================================================================
// Notification
// =============================================================================

/// The transient notification shown for a failed operation.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Paracetamol: available 5, requested 6"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed
    ValidationError,

    /// Not enough stock for a deduction
    InsufficientStock,

    /// Referenced document missing
    NotFound,

    /// Store failure
    StoreUnavailable,
}

/// Shown for every store failure; the cause is in the logs.
pub const STORE_UNAVAILABLE_MESSAGE: &str = "Something went wrong. Please try again.";

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }
}

impl From<BackofficeError> for ApiError {
    fn from(err: BackofficeError) -> Self {
        match err {
            BackofficeError::Validation(e) => ApiError::new(ErrorCode::ValidationError, e.to_string()),
            e @ BackofficeError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, e.to_string())
            }
            e @ BackofficeError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, e.to_string()),
            BackofficeError::StoreUnavailable(_) => {
                ApiError::new(ErrorCode::StoreUnavailable, STORE_UNAVAILABLE_MESSAGE)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
