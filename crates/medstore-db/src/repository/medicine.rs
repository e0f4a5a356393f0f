//! # Medicine Repository
//!
//! Reads and writes `medicine_inventory` documents.
//!
//! Stock and history are written by separate calls on purpose: the ledger
//! updates the quantity first and appends the history entry second, and a
//! failure between the two leaves the new quantity without its entry.

use serde::Serialize;
use tracing::debug;

use medstore_core::collections::MEDICINE_INVENTORY;
use medstore_core::{History, Medicine, Money};

use crate::document::{encode, Filter};
use crate::error::{DbError, DbResult};
use crate::store::SharedStore;

#[derive(Serialize)]
struct StockPatch {
    stock: i64,
}

#[derive(Serialize)]
struct HistoryPatch<'a> {
    history: &'a History,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailsPatch<'a> {
    name: &'a str,
    category: &'a str,
    #[serde(rename = "type")]
    medicine_type: &'a str,
    power: &'a str,
    price: Money,
    selling_price: Money,
    history: &'a History,
}

/// Repository for medicine documents.
///
/// ## Usage
/// ```rust,ignore
/// let repo = MedicineRepository::new(store);
/// let medicine = repo.get("m1").await?;
/// repo.set_stock("m1", medicine.stock - 3).await?;
/// ```
#[derive(Clone)]
pub struct MedicineRepository {
    store: SharedStore,
}

impl MedicineRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Fetches a medicine, `None` when the id does not resolve.
    pub async fn find(&self, id: &str) -> DbResult<Option<Medicine>> {
        match self.store.get(MEDICINE_INVENTORY, id).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    /// Fetches a medicine or fails with `NotFound`.
    pub async fn get(&self, id: &str) -> DbResult<Medicine> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found(MEDICINE_INVENTORY, id))
    }

    /// All medicines, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Medicine>> {
        let docs = self.store.query(MEDICINE_INVENTORY, &Filter::all()).await?;
        let mut medicines = docs
            .iter()
            .map(|doc| doc.decode())
            .collect::<DbResult<Vec<Medicine>>>()?;
        medicines.sort_by_key(|m| m.name.to_lowercase());

        debug!(count = medicines.len(), "Listed medicines");
        Ok(medicines)
    }

    /// Stores a new medicine and returns its generated id.
    pub async fn insert(&self, medicine: &Medicine) -> DbResult<String> {
        debug!(name = %medicine.name, "Inserting medicine");
        self.store.add(MEDICINE_INVENTORY, encode(medicine)?).await
    }

    /// Overwrites the quantity on hand.
    pub async fn set_stock(&self, id: &str, stock: i64) -> DbResult<()> {
        debug!(id = %id, stock, "Writing stock");
        self.store
            .update(MEDICINE_INVENTORY, id, encode(&StockPatch { stock })?)
            .await
    }

    /// Overwrites the history sequence.
    pub async fn set_history(&self, id: &str, history: &History) -> DbResult<()> {
        debug!(id = %id, entries = history.len(), "Writing history");
        self.store
            .update(MEDICINE_INVENTORY, id, encode(&HistoryPatch { history })?)
            .await
    }

    /// Writes every field except `stock`, in one document update.
    pub async fn update_details(&self, medicine: &Medicine) -> DbResult<()> {
        debug!(id = %medicine.id, "Updating medicine details");
        let patch = DetailsPatch {
            name: &medicine.name,
            category: &medicine.category,
            medicine_type: &medicine.medicine_type,
            power: &medicine.power,
            price: medicine.price,
            selling_price: medicine.selling_price,
            history: &medicine.history,
        };
        self.store
            .update(MEDICINE_INVENTORY, &medicine.id, encode(&patch)?)
            .await
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting medicine");
        self.store.delete(MEDICINE_INVENTORY, id).await
    }

    pub async fn count(&self) -> DbResult<usize> {
        Ok(self
            .store
            .query(MEDICINE_INVENTORY, &Filter::all())
            .await?
            .len())
    }
}
