//! # Invoice Processor
//!
//! Turns a cart plus seller and buyer details into a stored invoice,
//! deducting stock through the [`StockLedger`] on the way.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_invoice(draft)                                                  │
//! │                                                                         │
//! │  1. validate parties + every line          ── nothing written on error │
//! │  2. totals = compute_totals(lines, paid)                               │
//! │  3. for each line with a resolving medicineId, in order:               │
//! │        ledger.adjust_stock(id, -qty, sale to buyer)                    │
//! │        └── error ─► return it; earlier lines STAY deducted             │
//! │  4. annotate lines with sellHistory                                    │
//! │  5. add invoice document ─► id                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting an invoice never gives stock back.

use chrono::Utc;
use tracing::{debug, info, warn};

use medstore_core::invoice::{apply_payment, compute_totals, sell_annotation};
use medstore_core::stock::StockReason;
use medstore_core::validation::{validate_line_item, validate_party, validate_payment_amount};
use medstore_core::{Invoice, LineItem, Money, Party, PaymentMode, PaymentStatus};
use medstore_db::{InvoiceRepository, MedicineRepository, SharedStore};

use crate::error::BackofficeResult;
use crate::services::ledger::StockLedger;

/// A sale as entered, before totals and stock are applied.
#[derive(Debug, Clone, Default)]
pub struct InvoiceDraft {
    pub from: Party,
    pub to: Party,
    pub items: Vec<LineItem>,
    pub payment_mode: PaymentMode,
    pub paid_amount: Money,
    pub scanned_bill: Option<String>,
}

#[derive(Clone)]
pub struct InvoiceProcessor {
    ledger: StockLedger,
    medicines: MedicineRepository,
    invoices: InvoiceRepository,
}

impl InvoiceProcessor {
    pub fn new(store: SharedStore) -> Self {
        Self {
            ledger: StockLedger::new(store.clone()),
            medicines: MedicineRepository::new(store.clone()),
            invoices: InvoiceRepository::new(store),
        }
    }

    /// Creates an invoice and returns its id.
    ///
    /// ## Errors
    /// - `Validation` before any stock moves
    /// - `InsufficientStock` from the first line that cannot be covered; no
    ///   invoice is written but lines before it remain deducted
    /// - `StoreUnavailable` for any store failure, with the same caveat
    pub async fn create_invoice(&self, draft: InvoiceDraft) -> BackofficeResult<String> {
        validate_party("seller", &draft.from)?;
        validate_party("buyer", &draft.to)?;
        for item in &draft.items {
            validate_line_item(item)?;
        }

        let totals = compute_totals(&draft.items, draft.paid_amount);
        debug!(
            buyer = %draft.to.name,
            lines = draft.items.len(),
            total = %totals.total,
            status = %totals.status,
            "Creating invoice"
        );

        let mut deducted: Vec<String> = Vec::new();
        for item in &draft.items {
            let Some(medicine_id) = item.medicine_id.as_deref() else {
                continue;
            };

            let resolved = match self.medicines.find(medicine_id).await {
                Ok(found) => found.is_some(),
                Err(e) => {
                    warn_partial(&deducted);
                    return Err(e.into());
                }
            };
            if !resolved {
                warn!(
                    medicine_id = %medicine_id,
                    line = %item.name,
                    "Line references a missing medicine, stock not moved"
                );
                continue;
            }

            if let Err(e) = self
                .ledger
                .adjust_stock(medicine_id, -item.quantity, StockReason::sale_to(&draft.to.name))
                .await
            {
                warn_partial(&deducted);
                return Err(e);
            }
            deducted.push(medicine_id.to_string());
        }

        let now = Utc::now();
        let medicines = draft
            .items
            .into_iter()
            .map(|mut item| {
                item.sell_history = Some(sell_annotation(&item, &draft.to.name, now));
                item
            })
            .collect();

        let invoice = Invoice {
            id: String::new(),
            from: draft.from,
            to: draft.to,
            medicines,
            total: totals.total,
            paid_amount: totals.paid,
            remaining_amount: totals.remaining,
            payment_status: totals.status,
            payment_mode: draft.payment_mode,
            date: now,
            scanned_bill: draft.scanned_bill,
        };

        let id = self.invoices.insert(&invoice).await.inspect_err(|_| {
            warn_partial(&deducted);
        })?;

        info!(invoice_id = %id, total = %invoice.total, "Invoice created");
        Ok(id)
    }

    /// Overwrites the stored status. Amounts are left as they are.
    pub async fn update_payment_status(
        &self,
        invoice_id: &str,
        status: PaymentStatus,
    ) -> BackofficeResult<()> {
        self.invoices.set_payment_status(invoice_id, status).await?;
        info!(invoice_id = %invoice_id, status = %status, "Payment status updated");
        Ok(())
    }

    /// Adds `amount` to the paid total and re-derives remaining and status.
    pub async fn record_payment(&self, invoice_id: &str, amount: Money) -> BackofficeResult<Invoice> {
        validate_payment_amount(amount)?;

        let mut invoice = self.invoices.get(invoice_id).await?;
        let totals = apply_payment(invoice.total, invoice.paid_amount, amount);
        self.invoices
            .set_payment(invoice_id, totals.paid, totals.remaining, totals.status)
            .await?;

        info!(
            invoice_id = %invoice_id,
            amount = %amount,
            status = %totals.status,
            "Payment recorded"
        );

        invoice.paid_amount = totals.paid;
        invoice.remaining_amount = totals.remaining;
        invoice.payment_status = totals.status;
        Ok(invoice)
    }

    /// Edits seller, buyer and payment mode. Lines and stock are untouched.
    pub async fn update_details(
        &self,
        invoice_id: &str,
        from: Party,
        to: Party,
        payment_mode: PaymentMode,
    ) -> BackofficeResult<()> {
        validate_party("seller", &from)?;
        validate_party("buyer", &to)?;
        self.invoices
            .set_details(invoice_id, &from, &to, payment_mode)
            .await?;
        info!(invoice_id = %invoice_id, "Invoice details updated");
        Ok(())
    }

    /// Removes the invoice. Stock deducted for it is not restored.
    pub async fn delete_invoice(&self, invoice_id: &str) -> BackofficeResult<()> {
        self.invoices.delete(invoice_id).await?;
        info!(invoice_id = %invoice_id, "Invoice deleted");
        Ok(())
    }

    pub async fn get_invoice(&self, invoice_id: &str) -> BackofficeResult<Invoice> {
        Ok(self.invoices.get(invoice_id).await?)
    }

    /// All invoices, newest first.
    pub async fn list_invoices(&self) -> BackofficeResult<Vec<Invoice>> {
        Ok(self.invoices.list().await?)
    }

    pub async fn list_by_status(&self, status: PaymentStatus) -> BackofficeResult<Vec<Invoice>> {
        Ok(self.invoices.list_by_status(status).await?)
    }
}

fn warn_partial(deducted: &[String]) {
    if !deducted.is_empty() {
        warn!(
            medicines = ?deducted,
            "Invoice aborted after stock was deducted; deductions are not rolled back"
        );
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackofficeError;
    use crate::services::test_support::{memory_store, put_medicine};
    use medstore_core::collections::INVOICES;
    use medstore_core::ValidationError;

    fn draft(items: Vec<LineItem>, paid_rupees: i64) -> InvoiceDraft {
        InvoiceDraft {
            from: Party::new("City Pharmacy", "0300-1234567", "Main Bazaar"),
            to: Party::new("Ali", "0311-7654321", ""),
            items,
            payment_mode: PaymentMode::Cash,
            paid_amount: Money::from_rupees(paid_rupees),
            scanned_bill: None,
        }
    }

    fn line(medicine_id: &str, name: &str, qty: i64, price: i64) -> LineItem {
        LineItem::new(name, Some(medicine_id.to_string()), qty, Money::from_rupees(price))
    }

    async fn stock_of(store: &SharedStore, id: &str) -> i64 {
        MedicineRepository::new(store.clone()).get(id).await.unwrap().stock
    }

    #[tokio::test]
    async fn test_sale_deducts_stock_and_totals() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        let processor = InvoiceProcessor::new(store.clone());

        let id = processor
            .create_invoice(draft(vec![line("m1", "Paracetamol", 3, 15)], 0))
            .await
            .unwrap();

        assert_eq!(stock_of(&store, "m1").await, 2);

        let invoice = processor.get_invoice(&id).await.unwrap();
        assert_eq!(invoice.total, Money::from_rupees(45));
        assert_eq!(invoice.remaining_amount, Money::from_rupees(45));
        assert_eq!(invoice.payment_status, PaymentStatus::Pending);
        let note = invoice.medicines[0].sell_history.as_deref().unwrap();
        assert!(note.starts_with("Sold 3 x Paracetamol at ₹15.00 each to Ali on "));

        let history = StockLedger::new(store).get_history("m1").await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_overdraw_writes_nothing() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        let processor = InvoiceProcessor::new(store.clone());

        let err = processor
            .create_invoice(draft(vec![line("m1", "Paracetamol", 6, 15)], 0))
            .await
            .unwrap_err();

        assert!(matches!(err, BackofficeError::InsufficientStock { ref medicine, .. } if medicine == "Paracetamol"));
        assert_eq!(stock_of(&store, "m1").await, 5);
        assert!(processor.list_invoices().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_line_failure_keeps_first_deduction() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        put_medicine(&store, "m2", "Amoxicillin", 1, 20, 30).await;
        let processor = InvoiceProcessor::new(store.clone());

        let result = processor
            .create_invoice(draft(
                vec![line("m1", "Paracetamol", 3, 15), line("m2", "Amoxicillin", 2, 30)],
                0,
            ))
            .await;

        assert!(matches!(result, Err(BackofficeError::InsufficientStock { .. })));
        assert!(processor.list_invoices().await.unwrap().is_empty());
        assert_eq!(stock_of(&store, "m1").await, 2);
        assert_eq!(stock_of(&store, "m2").await, 1);
    }

    #[tokio::test]
    async fn test_empty_cart_is_zero_total() {
        let (_, store) = memory_store();
        let processor = InvoiceProcessor::new(store);

        let id = processor.create_invoice(draft(vec![], 0)).await.unwrap();
        let invoice = processor.get_invoice(&id).await.unwrap();

        assert!(invoice.total.is_zero());
        assert!(invoice.remaining_amount.is_zero());
        assert_eq!(invoice.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_payment_status_derived_at_creation() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 50, 10, 15).await;
        let processor = InvoiceProcessor::new(store);

        let cases = [
            (45, PaymentStatus::Paid),
            (60, PaymentStatus::Paid),
            (20, PaymentStatus::PartiallyPaid),
            (0, PaymentStatus::Pending),
        ];
        for (paid, expected) in cases {
            let id = processor
                .create_invoice(draft(vec![line("m1", "Paracetamol", 3, 15)], paid))
                .await
                .unwrap();
            let invoice = processor.get_invoice(&id).await.unwrap();
            assert_eq!(invoice.payment_status, expected, "paid {}", paid);
            assert_eq!(invoice.remaining_amount, Money::from_rupees(45 - paid));
        }
    }

    #[tokio::test]
    async fn test_lines_without_medicine_do_not_move_stock() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        let processor = InvoiceProcessor::new(store.clone());

        let items = vec![
            LineItem::new("Bandage", None, 2, Money::from_rupees(50)),
            line("deleted-id", "Old syrup", 1, 80),
            line("m1", "Paracetamol", 1, 15),
        ];
        let id = processor.create_invoice(draft(items, 0)).await.unwrap();

        assert_eq!(stock_of(&store, "m1").await, 4);
        let invoice = processor.get_invoice(&id).await.unwrap();
        assert_eq!(invoice.total, Money::from_rupees(195));
    }

    #[tokio::test]
    async fn test_validation_runs_before_stock() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        let processor = InvoiceProcessor::new(store.clone());

        let mut bad = draft(vec![line("m1", "Paracetamol", 2, 15)], 0);
        bad.to.name = "  ".into();
        let err = processor.create_invoice(bad).await.unwrap_err();
        assert!(matches!(err, BackofficeError::Validation(ValidationError::Required { .. })));

        let err = processor
            .create_invoice(draft(
                vec![line("m1", "Paracetamol", 2, 15), line("m1", "Paracetamol", 0, 15)],
                0,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, BackofficeError::Validation(_)));
        assert_eq!(stock_of(&store, "m1").await, 5);
    }

    #[tokio::test]
    async fn test_oversized_price_is_rejected_before_stock() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        let processor = InvoiceProcessor::new(store.clone());

        let mut huge = line("m1", "Paracetamol", 3, 0);
        huge.price = Money::from_paise(i64::MAX / 2);
        let err = processor.create_invoice(draft(vec![huge], 0)).await.unwrap_err();

        assert!(matches!(
            err,
            BackofficeError::Validation(ValidationError::OutOfRange { .. })
        ));
        assert_eq!(stock_of(&store, "m1").await, 5);
        assert!(processor.list_invoices().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lists_invoice_with_text_quantity() {
        let (_, store) = memory_store();
        let doc = serde_json::json!({
            "from": { "name": "City Pharmacy", "phone": "", "address": "" },
            "to": { "name": "Ali", "phone": "", "address": "" },
            "medicines": [ { "name": "Paracetamol", "medicineId": "m1", "quantity": "3", "price": "15" } ],
            "total": 45,
            "paidAmount": 0,
            "remainingAmount": 45,
            "paymentStatus": "Pending",
            "paymentMode": "Cash",
            "date": "2024-03-14T10:12:01.000Z"
        });
        let serde_json::Value::Object(fields) = doc else {
            unreachable!()
        };
        store.set(INVOICES, "legacy", fields).await.unwrap();

        let processor = InvoiceProcessor::new(store);
        let invoices = processor.list_invoices().await.unwrap();

        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].medicines[0].quantity, 3);
        assert_eq!(invoices[0].medicines[0].line_total(), Money::from_rupees(45));
    }

    #[tokio::test]
    async fn test_status_update_is_raw_overwrite() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        let processor = InvoiceProcessor::new(store);
        let id = processor
            .create_invoice(draft(vec![line("m1", "Paracetamol", 3, 15)], 0))
            .await
            .unwrap();

        processor
            .update_payment_status(&id, PaymentStatus::Paid)
            .await
            .unwrap();

        let invoice = processor.get_invoice(&id).await.unwrap();
        assert_eq!(invoice.payment_status, PaymentStatus::Paid);
        assert!(invoice.paid_amount.is_zero());
        assert_eq!(invoice.remaining_amount, Money::from_rupees(45));
    }

    #[tokio::test]
    async fn test_record_payment_rederives_status() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        let processor = InvoiceProcessor::new(store);
        let id = processor
            .create_invoice(draft(vec![line("m1", "Paracetamol", 3, 15)], 0))
            .await
            .unwrap();

        let partial = processor
            .record_payment(&id, Money::from_rupees(20))
            .await
            .unwrap();
        assert_eq!(partial.payment_status, PaymentStatus::PartiallyPaid);
        assert_eq!(partial.remaining_amount, Money::from_rupees(25));

        processor.record_payment(&id, Money::from_rupees(25)).await.unwrap();
        let stored = processor.get_invoice(&id).await.unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
        assert!(stored.remaining_amount.is_zero());

        let err = processor.record_payment(&id, Money::zero()).await.unwrap_err();
        assert!(matches!(err, BackofficeError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_does_not_restore_stock() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        let processor = InvoiceProcessor::new(store.clone());
        let id = processor
            .create_invoice(draft(vec![line("m1", "Paracetamol", 3, 15)], 0))
            .await
            .unwrap();

        processor.delete_invoice(&id).await.unwrap();

        assert!(matches!(
            processor.get_invoice(&id).await,
            Err(BackofficeError::NotFound { .. })
        ));
        assert_eq!(stock_of(&store, "m1").await, 2);
    }

    #[tokio::test]
    async fn test_update_details_leaves_lines() {
        let (_, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        let processor = InvoiceProcessor::new(store);
        let id = processor
            .create_invoice(draft(vec![line("m1", "Paracetamol", 3, 15)], 0))
            .await
            .unwrap();

        processor
            .update_details(
                &id,
                Party::new("City Pharmacy", "", ""),
                Party::new("Ali Raza", "0311", "Gulberg"),
                PaymentMode::Online,
            )
            .await
            .unwrap();

        let invoice = processor.get_invoice(&id).await.unwrap();
        assert_eq!(invoice.to.name, "Ali Raza");
        assert_eq!(invoice.payment_mode, PaymentMode::Online);
        assert_eq!(invoice.medicines.len(), 1);
        assert_eq!(invoice.total, Money::from_rupees(45));
    }

    #[tokio::test]
    async fn test_offline_store_fails_without_invoice() {
        let (memory, store) = memory_store();
        put_medicine(&store, "m1", "Paracetamol", 5, 10, 15).await;
        let processor = InvoiceProcessor::new(store);

        memory.set_offline(true);
        let err = processor
            .create_invoice(draft(vec![line("m1", "Paracetamol", 3, 15)], 0))
            .await
            .unwrap_err();
        assert!(matches!(err, BackofficeError::StoreUnavailable(_)));

        memory.set_offline(false);
        assert!(processor.list_invoices().await.unwrap().is_empty());
    }
}
