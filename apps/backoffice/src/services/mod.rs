//! # Back-Office Services
//!
//! Each service owns its repositories and turns store and rule failures into
//! [`BackofficeError`](crate::error::BackofficeError).
//!
//! ```text
//! InvoiceProcessor ──► StockLedger ──► MedicineRepository ──┐
//!        │                                                   ├──► DocumentStore
//!        └───────────────────────────► InvoiceRepository ───┘
//!
//! Catalog ──► MedicineRepository, LookupRepository<Type|Category>
//! Dashboard ──► subscribe(medicine_inventory) + subscribe(invoices)
//! ```

pub mod catalog;
pub mod dashboard;
pub mod invoice;
pub mod ledger;

pub use catalog::{Catalog, MedicineDetails, NewMedicine};
pub use dashboard::{Dashboard, DashboardHandle};
pub use invoice::{InvoiceDraft, InvoiceProcessor};
pub use ledger::{StockAdjustment, StockLedger};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use medstore_core::collections::MEDICINE_INVENTORY;
    use medstore_core::{History, Medicine, Money};
    use medstore_db::{encode, MemoryStore, SharedStore};

    pub fn memory_store() -> (Arc<MemoryStore>, SharedStore) {
        let memory = Arc::new(MemoryStore::new());
        let shared: SharedStore = memory.clone();
        (memory, shared)
    }

    /// Stores a medicine under a fixed id, prices in whole rupees.
    pub async fn put_medicine(
        store: &SharedStore,
        id: &str,
        name: &str,
        stock: i64,
        price: i64,
        selling_price: i64,
    ) {
        let medicine = Medicine {
            id: id.to_string(),
            name: name.to_string(),
            category: "Analgesic".to_string(),
            medicine_type: "Tablet".to_string(),
            power: "500mg".to_string(),
            price: Money::from_rupees(price),
            selling_price: Money::from_rupees(selling_price),
            stock,
            history: History::new(),
        };
        store
            .set(MEDICINE_INVENTORY, id, encode(&medicine).unwrap())
            .await
            .unwrap();
    }
}
