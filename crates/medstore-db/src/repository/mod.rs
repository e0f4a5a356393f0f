//! # Repository Module
//!
//! Typed access to the back-office collections over any [`DocumentStore`].
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Service                                                               │
//! │       │                                                                 │
//! │       │  medicines.get("m1")                                           │
//! │       ▼                                                                 │
//! │  MedicineRepository                                                    │
//! │  ├── get / find / list                                                 │
//! │  ├── insert                                                            │
//! │  ├── set_stock / set_history / update_details                          │
//! │  └── delete                                                            │
//! │       │                                                                 │
//! │       │  Document ⇄ Medicine (serde)                                   │
//! │       ▼                                                                 │
//! │  Arc<dyn DocumentStore> (MemoryStore or Database)                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Partial writes are small `Serialize` patch structs so the stored field
//! names come from one place: the serde attributes.
//!
//! ## Available Repositories
//!
//! - [`MedicineRepository`](medicine::MedicineRepository) - `medicine_inventory`
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - `invoices`
//! - [`LookupRepository`](lookup::LookupRepository) - `medicine_types`, `medicine_categories`
//!
//! [`DocumentStore`]: crate::store::DocumentStore

pub mod invoice;
pub mod lookup;
pub mod medicine;
