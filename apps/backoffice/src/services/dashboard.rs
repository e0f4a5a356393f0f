//! # Reporting Aggregator
//!
//! Dashboard totals derived from every medicine and invoice document.
//! Nothing is cached: each report is a full scan.
//!
//! ## Live Mode
//! ```text
//! subscribe(medicine_inventory) ──┐
//!                                  ├──► select! ──► latest medicines / invoices
//! subscribe(invoices) ────────────┘                      │
//!                                                        ▼
//!                                   DashboardReport::compute(..) ──► watch::Sender
//!                                                                         │
//!                                        DashboardHandle::changed() ◄─────┘
//! ```
//!
//! A report is published once both collections have delivered their first
//! snapshot, then again after every snapshot of either one.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use medstore_core::collections::{INVOICES, MEDICINE_INVENTORY};
use medstore_core::{DashboardReport, Invoice, Medicine};
use medstore_db::{
    subscribe, Filter, InvoiceRepository, MedicineRepository, SharedStore, Snapshot,
};

use crate::error::BackofficeResult;

pub struct Dashboard;

impl Dashboard {
    /// One-shot report from the current contents of the store.
    pub async fn snapshot(store: &SharedStore, low_stock_threshold: i64) -> BackofficeResult<DashboardReport> {
        let medicines = MedicineRepository::new(store.clone()).list().await?;
        let invoices = InvoiceRepository::new(store.clone()).list().await?;
        Ok(DashboardReport::compute(&medicines, &invoices, low_stock_threshold))
    }

    /// Starts a live report that follows both collections.
    ///
    /// Must be called from within a Tokio runtime. The returned handle owns
    /// the subscriptions; stop or drop it on teardown.
    pub fn start(store: SharedStore, low_stock_threshold: i64) -> DashboardHandle {
        let (tx, receiver) = watch::channel(None);

        let mut medicine_sub = subscribe(store.clone(), MEDICINE_INVENTORY, Filter::all());
        let mut invoice_sub = subscribe(store, INVOICES, Filter::all());

        let task = tokio::spawn(async move {
            let mut medicines: Option<Vec<Medicine>> = None;
            let mut invoices: Option<Vec<Invoice>> = None;

            loop {
                tokio::select! {
                    next = medicine_sub.next() => match next {
                        Some(Ok(snapshot)) => medicines = Some(decode_snapshot(&snapshot)),
                        Some(Err(e)) => {
                            warn!(error = %e, "Medicine snapshot failed, keeping previous");
                            continue;
                        }
                        None => break,
                    },
                    next = invoice_sub.next() => match next {
                        Some(Ok(snapshot)) => invoices = Some(decode_snapshot(&snapshot)),
                        Some(Err(e)) => {
                            warn!(error = %e, "Invoice snapshot failed, keeping previous");
                            continue;
                        }
                        None => break,
                    },
                }

                if let (Some(medicines), Some(invoices)) = (&medicines, &invoices) {
                    let report = DashboardReport::compute(medicines, invoices, low_stock_threshold);
                    debug!(
                        medicines = report.medicine_count,
                        invoices = report.invoice_count,
                        "Dashboard recomputed"
                    );
                    if tx.send(Some(report)).is_err() {
                        break;
                    }
                }
            }

            debug!("Dashboard listener stopped");
        });

        info!(low_stock_threshold, "Live dashboard started");
        DashboardHandle { receiver, task }
    }
}

/// Decodes every document it can. One bad document does not hide the rest.
fn decode_snapshot<T: serde::de::DeserializeOwned>(snapshot: &Snapshot) -> Vec<T> {
    snapshot
        .documents
        .iter()
        .filter_map(|doc| match doc.decode::<T>() {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(collection = %snapshot.collection, id = %doc.id, error = %e, "Undecodable document skipped");
                None
            }
        })
        .collect()
}

/// Live dashboard. Dropping it stops the listener and both subscriptions.
#[derive(Debug)]
pub struct DashboardHandle {
    receiver: watch::Receiver<Option<DashboardReport>>,
    task: JoinHandle<()>,
}

impl DashboardHandle {
    /// The most recent report, `None` until both collections have loaded.
    pub fn latest(&self) -> Option<DashboardReport> {
        *self.receiver.borrow()
    }

    /// Waits for the next report. `None` once the dashboard has stopped.
    pub async fn changed(&mut self) -> Option<DashboardReport> {
        self.receiver.changed().await.ok()?;
        *self.receiver.borrow_and_update()
    }

    /// Another receiver of the same reports.
    pub fn subscribe(&self) -> watch::Receiver<Option<DashboardReport>> {
        self.receiver.clone()
    }

    pub fn stop(self) {
        debug!("Stopping live dashboard");
    }
}

impl Drop for DashboardHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::invoice::{InvoiceDraft, InvoiceProcessor};
    use crate::services::test_support::{memory_store, put_medicine};
    use medstore_core::{LineItem, Money, Party, PaymentStatus};
    use std::time::Duration;

    fn sale(medicine_id: &str, qty: i64, price: i64, paid: i64) -> InvoiceDraft {
        InvoiceDraft {
            from: Party::new("City Pharmacy", "", ""),
            to: Party::new("Ali", "", ""),
            items: vec![LineItem::new(
                "Paracetamol",
                Some(medicine_id.to_string()),
                qty,
                Money::from_rupees(price),
            )],
            paid_amount: Money::from_rupees(paid),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_store_reports_zero() {
        let (_, store) = memory_store();
        let report = Dashboard::snapshot(&store, 10).await.unwrap();
        assert_eq!(report, DashboardReport::default());
        assert_eq!(report.total_sales, Money::zero());
        assert_eq!(report.total_profit, Money::zero());
    }

    #[tokio::test]
    async fn test_snapshot_totals() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        put_medicine(&store, "m2", "Amoxicillin", 20, 20, 30).await;
        let processor = InvoiceProcessor::new(store.clone());
        processor.create_invoice(sale("m1", 3, 15, 45)).await.unwrap();
        processor.create_invoice(sale("m2", 2, 30, 0)).await.unwrap();
        processor.create_invoice(sale("m2", 1, 30, 10)).await.unwrap();

        let report = Dashboard::snapshot(&store, 10).await.unwrap();

        assert_eq!(report.medicine_count, 2);
        assert_eq!(report.invoice_count, 3);
        assert_eq!(report.total_stock, 2 + 17);
        assert_eq!(report.total_inventory_value, Money::from_rupees(2 * 10 + 17 * 20));
        assert_eq!(report.low_stock_count, 1);
        assert_eq!(report.total_sales, Money::from_rupees(45 + 60 + 30));
        assert_eq!(report.paid_amount, Money::from_rupees(45));
        assert_eq!(report.pending_amount, Money::from_rupees(60));
        assert_eq!(report.total_profit, Money::from_rupees(3 * 5 + 2 * 10 + 10));
    }

    #[tokio::test]
    async fn test_live_report_follows_changes() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        let mut handle = Dashboard::start(store.clone(), 10);

        let first = tokio::time::timeout(Duration::from_secs(2), handle.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.medicine_count, 1);
        assert_eq!(first.invoice_count, 0);

        InvoiceProcessor::new(store)
            .create_invoice(sale("m1", 3, 15, 0))
            .await
            .unwrap();

        let report = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let report = handle.changed().await.unwrap();
                // The two collections report independently.
                if report.invoice_count == 1 && report.total_stock == 2 {
                    return report;
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(report.pending_amount, Money::from_rupees(45));
        assert_eq!(handle.latest(), Some(report));
        handle.stop();
    }

    #[tokio::test]
    async fn test_live_report_skips_undecodable_documents() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        InvoiceProcessor::new(store.clone())
            .create_invoice(sale("m1", 3, 15, 45))
            .await
            .unwrap();
        let serde_json::Value::Object(junk) = serde_json::json!({ "total": "lots" }) else {
            unreachable!()
        };
        store.set(INVOICES, "junk", junk).await.unwrap();

        let mut handle = Dashboard::start(store, 10);
        let report = tokio::time::timeout(Duration::from_secs(2), handle.changed())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.invoice_count, 1);
        assert_eq!(report.paid_amount, Money::from_rupees(45));
    }

    #[tokio::test]
    async fn test_status_change_moves_paid_amount() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        let processor = InvoiceProcessor::new(store.clone());
        let id = processor.create_invoice(sale("m1", 3, 15, 0)).await.unwrap();

        processor
            .update_payment_status(&id, PaymentStatus::Paid)
            .await
            .unwrap();

        let report = Dashboard::snapshot(&store, 10).await.unwrap();
        assert_eq!(report.paid_amount, Money::from_rupees(45));
        assert!(report.pending_amount.is_zero());
    }
}
