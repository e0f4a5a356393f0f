//! # Invoice Repository
//!
//! Reads and writes `invoices` documents.

use serde::Serialize;
use tracing::debug;

use medstore_core::collections::INVOICES;
use medstore_core::{Invoice, Money, Party, PaymentMode, PaymentStatus};

use crate::document::{encode, Filter};
use crate::error::{DbError, DbResult};
use crate::store::SharedStore;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusPatch {
    payment_status: PaymentStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentPatch {
    paid_amount: Money,
    remaining_amount: Money,
    payment_status: PaymentStatus,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DetailsPatch<'a> {
    from: &'a Party,
    to: &'a Party,
    payment_mode: PaymentMode,
}

/// Repository for invoice documents.
#[derive(Clone)]
pub struct InvoiceRepository {
    store: SharedStore,
}

impl InvoiceRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<Invoice>> {
        match self.store.get(INVOICES, id).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    /// Fetches an invoice or fails with `NotFound`.
    pub async fn get(&self, id: &str) -> DbResult<Invoice> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found(INVOICES, id))
    }

    /// All invoices, newest first.
    pub async fn list(&self) -> DbResult<Vec<Invoice>> {
        self.list_matching(&Filter::all()).await
    }

    /// Invoices with the given payment status, newest first.
    pub async fn list_by_status(&self, status: PaymentStatus) -> DbResult<Vec<Invoice>> {
        self.list_matching(&Filter::eq("paymentStatus", status.as_str()))
            .await
    }

    async fn list_matching(&self, filter: &Filter) -> DbResult<Vec<Invoice>> {
        let docs = self.store.query(INVOICES, filter).await?;
        let mut invoices = docs
            .iter()
            .map(|doc| doc.decode())
            .collect::<DbResult<Vec<Invoice>>>()?;
        invoices.sort_by(|a, b| b.date.cmp(&a.date));

        debug!(count = invoices.len(), "Listed invoices");
        Ok(invoices)
    }

    /// Stores a new invoice and returns its generated id.
    pub async fn insert(&self, invoice: &Invoice) -> DbResult<String> {
        debug!(
            buyer = %invoice.to.name,
            lines = invoice.medicines.len(),
            total = %invoice.total,
            "Inserting invoice"
        );
        self.store.add(INVOICES, encode(invoice)?).await
    }

    /// Overwrites `paymentStatus` only.
    pub async fn set_payment_status(&self, id: &str, status: PaymentStatus) -> DbResult<()> {
        debug!(id = %id, status = %status, "Writing payment status");
        self.store
            .update(INVOICES, id, encode(&StatusPatch { payment_status: status })?)
            .await
    }

    /// Writes the three payment fields together.
    pub async fn set_payment(
        &self,
        id: &str,
        paid: Money,
        remaining: Money,
        status: PaymentStatus,
    ) -> DbResult<()> {
        debug!(id = %id, paid = %paid, status = %status, "Writing payment");
        let patch = PaymentPatch {
            paid_amount: paid,
            remaining_amount: remaining,
            payment_status: status,
        };
        self.store.update(INVOICES, id, encode(&patch)?).await
    }

    /// Writes seller, buyer and payment mode.
    pub async fn set_details(
        &self,
        id: &str,
        from: &Party,
        to: &Party,
        payment_mode: PaymentMode,
    ) -> DbResult<()> {
        debug!(id = %id, "Writing invoice details");
        let patch = DetailsPatch {
            from,
            to,
            payment_mode,
        };
        self.store.update(INVOICES, id, encode(&patch)?).await
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting invoice");
        self.store.delete(INVOICES, id).await
    }
}
