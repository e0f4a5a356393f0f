//! # medstore-db: Document Store Layer for the Medstore Back-Office
//!
//! Every read and write the back-office makes goes through this crate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Medstore Back-Office Data Flow                      │
//! │                                                                         │
//! │  StockLedger / InvoiceProcessor / Dashboard / Catalog (apps/backoffice)│
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   medstore-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │ Repositories  │    │ DocumentStore │    │  Migrations  │   │   │
//! │  │   │               │    │    (trait)    │    │  (embedded)  │   │   │
//! │  │   │ MedicineRepo  │───►│ MemoryStore   │    │ 001_docs.sql │   │   │
//! │  │   │ InvoiceRepo   │    │ Database      │───►│              │   │   │
//! │  │   │ LookupRepo<T> │    │ subscribe()   │    │              │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (persistent) or process memory (tests, demos)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`document`] - Documents, filters, change events
//! - [`store`] - `DocumentStore` trait and subscriptions
//! - [`memory`] - In-memory store
//! - [`pool`] - SQLite store and connection pool
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - Typed repositories over any store
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medstore_db::{Database, DbConfig, MedicineRepository};
//!
//! let store = Database::new(DbConfig::new("medstore.db")).await?.into_shared();
//! let medicines = MedicineRepository::new(store.clone()).list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod document;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use document::{encode, into_fields, ChangeEvent, ChangeKind, Document, Fields, Filter};
pub use error::{DbError, DbResult};
pub use memory::MemoryStore;
pub use pool::{Database, DbConfig};
pub use store::{subscribe, DocumentStore, SharedStore, Snapshot, Subscription};

// Repository re-exports for convenience
pub use repository::invoice::InvoiceRepository;
pub use repository::lookup::LookupRepository;
pub use repository::medicine::MedicineRepository;
