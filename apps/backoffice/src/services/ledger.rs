//! # Stock Ledger
//!
//! Owns quantity on hand and the audit trail of every medicine.
//!
//! ## Adjustment Flow
//! ```text
//! adjust_stock(id, delta, reason)
//!     │
//!     ├─1─► get medicine                      (NotFound if missing)
//!     ├─2─► plan_adjustment(stock, delta)     (InsufficientStock, nothing written)
//!     ├─3─► write stock = stock + delta       ── write #1
//!     └─4─► write history + 1 entry           ── write #2
//! ```
//!
//! Writes #1 and #2 are separate document updates. If #2 fails the new
//! quantity stays without its history entry. Concurrent sellers of the same
//! medicine can both read the same starting stock; there is no lock.

use chrono::Utc;
use tracing::{info, warn};

use medstore_core::stock::{plan_adjustment, StockReason};
use medstore_core::validation::validate_quantity;
use medstore_core::{History, HistoryEntry};
use medstore_db::{MedicineRepository, SharedStore};

use crate::error::BackofficeResult;

/// Result of a committed adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAdjustment {
    pub medicine_id: String,
    pub medicine_name: String,
    pub previous: i64,
    pub new_stock: i64,
    /// The history entry that was appended.
    pub entry: HistoryEntry,
}

#[derive(Clone)]
pub struct StockLedger {
    medicines: MedicineRepository,
}

impl StockLedger {
    pub fn new(store: SharedStore) -> Self {
        Self {
            medicines: MedicineRepository::new(store),
        }
    }

    /// Moves a medicine's stock by `delta` and records why.
    ///
    /// ## Errors
    /// - `Validation` for a zero delta
    /// - `InsufficientStock` when `stock + delta < 0`; stock is unchanged
    /// - `NotFound` when `medicine_id` does not resolve
    /// - `StoreUnavailable` for any store failure
    pub async fn adjust_stock(
        &self,
        medicine_id: &str,
        delta: i64,
        reason: StockReason,
    ) -> BackofficeResult<StockAdjustment> {
        let medicine = self.medicines.get(medicine_id).await?;
        let plan = plan_adjustment(&medicine.name, medicine.stock, delta)?;

        self.medicines.set_stock(medicine_id, plan.new_stock).await?;

        let entry = HistoryEntry::new(reason.describe(&medicine.name, delta), Utc::now());
        let history = medicine.history.append(entry.clone());
        if let Err(e) = self.medicines.set_history(medicine_id, &history).await {
            warn!(
                medicine_id = %medicine_id,
                new_stock = plan.new_stock,
                "Stock written but history entry was not"
            );
            return Err(e.into());
        }

        info!(
            medicine_id = %medicine_id,
            previous = plan.previous,
            new_stock = plan.new_stock,
            "Stock adjusted"
        );

        Ok(StockAdjustment {
            medicine_id: medicine_id.to_string(),
            medicine_name: medicine.name,
            previous: plan.previous,
            new_stock: plan.new_stock,
            entry,
        })
    }

    /// Manual addition of `quantity` units from the inventory screen.
    pub async fn restock(&self, medicine_id: &str, quantity: i64) -> BackofficeResult<StockAdjustment> {
        validate_quantity("quantity", quantity)?;
        self.adjust_stock(medicine_id, quantity, StockReason::Restock)
            .await
    }

    /// The stored history, oldest first.
    pub async fn get_history(&self, medicine_id: &str) -> BackofficeResult<History> {
        Ok(self.medicines.get(medicine_id).await?.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackofficeError;
    use crate::services::test_support::{memory_store, put_medicine};
    use medstore_core::ValidationError;

    #[tokio::test]
    async fn test_adjust_applies_delta_and_appends_one_entry() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        let ledger = StockLedger::new(store);

        let adj = ledger
            .adjust_stock("m1", -3, StockReason::sale_to("Ali"))
            .await
            .unwrap();
        assert_eq!(adj.previous, 5);
        assert_eq!(adj.new_stock, 2);

        let history = ledger.get_history("m1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(
            history.last().unwrap().action,
            "Sold 3 items of Paracetamol (sale to Ali)"
        );

        ledger.adjust_stock("m1", 4, StockReason::Restock).await.unwrap();
        let history = ledger.get_history("m1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.entries()[0].action, "Sold 3 items of Paracetamol (sale to Ali)");
    }

    #[tokio::test]
    async fn test_overdraw_leaves_stock_and_history_unchanged() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        let ledger = StockLedger::new(store.clone());

        let err = ledger
            .adjust_stock("m1", -6, StockReason::sale_to("Ali"))
            .await
            .unwrap_err();
        match err {
            BackofficeError::InsufficientStock {
                medicine,
                available,
                requested,
            } => {
                assert_eq!(medicine, "Paracetamol");
                assert_eq!(available, 5);
                assert_eq!(requested, 6);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let medicine = MedicineRepository::new(store).get("m1").await.unwrap();
        assert_eq!(medicine.stock, 5);
        assert!(medicine.history.is_empty());
    }

    #[tokio::test]
    async fn test_restock_requires_positive_quantity() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        let ledger = StockLedger::new(store);

        for qty in [0, -4] {
            let err = ledger.restock("m1", qty).await.unwrap_err();
            assert!(matches!(
                err,
                BackofficeError::Validation(ValidationError::MustBePositive { .. })
            ));
        }

        let adj = ledger.restock("m1", 10).await.unwrap();
        assert_eq!(adj.new_stock, 15);
        assert_eq!(adj.entry.action, "Added 10 more items of Paracetamol to stock");
    }

    #[tokio::test]
    async fn test_zero_delta_is_validation_error() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        let ledger = StockLedger::new(store);

        let err = ledger.adjust_stock("m1", 0, StockReason::Restock).await.unwrap_err();
        assert!(matches!(
            err,
            BackofficeError::Validation(ValidationError::MustBeNonZero { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_medicine_is_not_found() {
        let (_, store) = memory_store();
        let ledger = StockLedger::new(store);

        let err = ledger.restock("ghost", 1).await.unwrap_err();
        assert!(matches!(err, BackofficeError::NotFound { ref entity, .. } if entity == "Medicine"));
    }

    #[tokio::test]
    async fn test_offline_store_is_unavailable() {
        let (memory, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        memory.set_offline(true);

        let err = StockLedger::new(store).restock("m1", 1).await.unwrap_err();
        assert!(matches!(err, BackofficeError::StoreUnavailable(_)));
    }
}
