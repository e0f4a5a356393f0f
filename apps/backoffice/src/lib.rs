//! # Medstore Back-Office
//!
//! Services behind the pharmacy admin panel: stock ledger, invoice
//! processing, dashboard reporting and the medicine catalog.
//!
//! ## Module Organization
//! ```text
//! medstore_backoffice/
//! ├── lib.rs          ◄── You are here (startup: tracing, store, services)
//! ├── main.rs         ◄── `backoffice` command-line front end
//! ├── config.rs       ◄── BackofficeConfig (TOML + env overrides)
//! ├── error.rs        ◄── BackofficeError → ApiError notification
//! └── services/
//!     ├── ledger.rs   ◄── StockLedger
//!     ├── invoice.rs  ◄── InvoiceProcessor
//!     ├── dashboard.rs◄── Dashboard (one-shot + live)
//!     └── catalog.rs  ◄── Catalog (medicines, types, categories)
//! ```
//!
//! ## Startup Sequence
//! 1. Load [`BackofficeConfig`]
//! 2. [`init_tracing`] with the configured filter
//! 3. [`Backoffice::open`] connects the configured store (and migrates SQLite)
//! 4. Hand out services; every one shares the same store

pub mod config;
pub mod error;
pub mod services;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use medstore_core::DashboardReport;
use medstore_db::{Database, DbConfig, MemoryStore, SharedStore};

pub use config::{BackofficeConfig, ConfigError, StoreBackend};
pub use error::{ApiError, BackofficeError, BackofficeResult, ErrorCode};
pub use services::{
    Catalog, Dashboard, DashboardHandle, InvoiceDraft, InvoiceProcessor, MedicineDetails,
    NewMedicine, StockAdjustment, StockLedger,
};

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over `filter`, which wins over
/// [`config::DEFAULT_LOG_FILTER`]. Calling it twice is harmless.
pub fn init_tracing(filter: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter.unwrap_or(config::DEFAULT_LOG_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// An open store plus the settings the services need.
#[derive(Clone)]
pub struct Backoffice {
    store: SharedStore,
    low_stock_threshold: i64,
}

impl Backoffice {
    /// Opens the store named by `config`.
    pub async fn open(config: &BackofficeConfig) -> BackofficeResult<Self> {
        let store: SharedStore = match config.store.backend {
            StoreBackend::Memory => {
                info!("Using in-memory store");
                Arc::new(MemoryStore::new())
            }
            StoreBackend::Sqlite => {
                let path = config.database_path();
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent).map_err(|e| {
                            BackofficeError::StoreUnavailable(format!(
                                "cannot create {}: {}",
                                parent.display(),
                                e
                            ))
                        })?;
                    }
                }

                info!(path = %path.display(), "Opening SQLite store");
                let db_config = DbConfig::new(path).max_connections(config.store.max_connections);
                Database::new(db_config).await?.into_shared()
            }
        };

        Ok(Self::with_store(store, config.low_stock_threshold()))
    }

    /// Wraps an existing store.
    pub fn with_store(store: SharedStore, low_stock_threshold: i64) -> Self {
        Self {
            store,
            low_stock_threshold,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn ledger(&self) -> StockLedger {
        StockLedger::new(self.store.clone())
    }

    pub fn invoices(&self) -> InvoiceProcessor {
        InvoiceProcessor::new(self.store.clone())
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.store.clone())
    }

    /// One-shot dashboard report.
    pub async fn dashboard(&self) -> BackofficeResult<DashboardReport> {
        Dashboard::snapshot(&self.store, self.low_stock_threshold).await
    }

    /// Live dashboard following both collections.
    pub fn watch_dashboard(&self) -> DashboardHandle {
        Dashboard::start(self.store.clone(), self.low_stock_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medstore_core::{LineItem, Money, Party};

    #[tokio::test]
    async fn test_open_memory_backend_end_to_end() {
        let backoffice = Backoffice::open(&BackofficeConfig::in_memory()).await.unwrap();

        let medicine = backoffice
            .catalog()
            .add_medicine(NewMedicine {
                name: "Cetirizine".into(),
                price: Money::from_rupees(4),
                selling_price: Money::from_rupees(6),
                stock: 30,
                ..Default::default()
            })
            .await
            .unwrap();

        backoffice
            .invoices()
            .create_invoice(InvoiceDraft {
                from: Party::new("City Pharmacy", "", ""),
                to: Party::new("Sara", "", ""),
                items: vec![LineItem::new(
                    "Cetirizine",
                    Some(medicine.id.clone()),
                    25,
                    Money::from_rupees(6),
                )],
                paid_amount: Money::from_rupees(150),
                ..Default::default()
            })
            .await
            .unwrap();

        let report = backoffice.dashboard().await.unwrap();
        assert_eq!(report.total_stock, 5);
        assert_eq!(report.low_stock_count, 1);
        assert_eq!(report.paid_amount, Money::from_rupees(150));
        assert_eq!(report.total_profit, Money::from_rupees(50));

        let history = backoffice.ledger().get_history(&medicine.id).await.unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(Some("warn"));
        init_tracing(None);
    }
}
