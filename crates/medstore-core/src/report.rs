//! # Dashboard Aggregation
//!
//! Derives the dashboard metrics from full snapshots of the medicine and
//! invoice collections. Stateless: every call rescans everything, O(n).
//!
//! ## Metrics
//! | Metric                 | Definition                                          |
//! |------------------------|-----------------------------------------------------|
//! | `total_stock`          | Σ medicine.stock                                    |
//! | `total_inventory_value`| Σ medicine.stock × medicine.price                   |
//! | `low_stock_count`      | count(medicine.stock < threshold)                   |
//! | `total_sales`          | Σ invoice.total                                     |
//! | `paid_amount`          | Σ invoice.total where status = Paid                 |
//! | `pending_amount`       | Σ invoice.total where status = Pending              |
//! | `total_profit`         | Σ (line price − current cost price) × quantity      |
//!
//! Profit uses the medicine's cost price as it is *now*, not at sale time.
//! Lines whose medicine reference is absent or no longer resolves add no
//! profit. `Partially Paid` invoices count towards sales only.

use serde::Serialize;
use std::collections::HashMap;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Invoice, Medicine, PaymentStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub medicine_count: usize,
    pub invoice_count: usize,
    pub total_stock: i64,
    #[ts(type = "number")]
    pub total_inventory_value: Money,
    pub low_stock_count: usize,
    #[ts(type = "number")]
    pub total_sales: Money,
    #[ts(type = "number")]
    pub paid_amount: Money,
    #[ts(type = "number")]
    pub pending_amount: Money,
    #[ts(type = "number")]
    pub total_profit: Money,
}

impl DashboardReport {
    /// Computes the report. Empty inputs give an all-zero report.
    pub fn compute(medicines: &[Medicine], invoices: &[Invoice], low_stock_threshold: i64) -> Self {
        let cost_by_id: HashMap<&str, Money> = medicines
            .iter()
            .map(|m| (m.id.as_str(), m.price))
            .collect();

        let mut report = DashboardReport {
            medicine_count: medicines.len(),
            invoice_count: invoices.len(),
            ..Default::default()
        };

        for medicine in medicines {
            report.total_stock += medicine.stock;
            report.total_inventory_value += medicine.inventory_value();
            if medicine.is_low_stock(low_stock_threshold) {
                report.low_stock_count += 1;
            }
        }

        for invoice in invoices {
            report.total_sales += invoice.total;
            match invoice.payment_status {
                PaymentStatus::Paid => report.paid_amount += invoice.total,
                PaymentStatus::Pending => report.pending_amount += invoice.total,
                PaymentStatus::PartiallyPaid => {}
            }

            for line in &invoice.medicines {
                let cost = line
                    .medicine_id
                    .as_deref()
                    .and_then(|id| cost_by_id.get(id));
                if let Some(cost) = cost {
                    report.total_profit += (line.price - *cost) * line.quantity;
                }
            }
        }

        report
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{History, LineItem, Party, PaymentMode};
    use chrono::Utc;

    fn medicine(id: &str, stock: i64, cost: i64) -> Medicine {
        Medicine {
            id: id.into(),
            name: format!("Medicine {id}"),
            category: String::new(),
            medicine_type: String::new(),
            power: String::new(),
            price: Money::from_rupees(cost),
            selling_price: Money::from_rupees(cost + 5),
            stock,
            history: History::new(),
        }
    }

    fn invoice(lines: Vec<LineItem>, status: PaymentStatus) -> Invoice {
        let total = crate::invoice::invoice_total(&lines);
        Invoice {
            id: "inv".into(),
            from: Party::new("Store", "", ""),
            to: Party::new("Ali", "", ""),
            medicines: lines,
            total,
            paid_amount: Money::zero(),
            remaining_amount: total,
            payment_status: status,
            payment_mode: PaymentMode::Cash,
            date: Utc::now(),
            scanned_bill: None,
        }
    }

    #[test]
    fn test_empty_report_is_all_zero() {
        assert_eq!(DashboardReport::compute(&[], &[], 10), DashboardReport::default());
    }

    #[test]
    fn test_inventory_metrics() {
        let medicines = vec![medicine("m1", 5, 10), medicine("m2", 20, 3)];
        let report = DashboardReport::compute(&medicines, &[], 10);

        assert_eq!(report.total_stock, 25);
        assert_eq!(report.total_inventory_value, Money::from_rupees(110));
        assert_eq!(report.low_stock_count, 1);
    }

    #[test]
    fn test_sales_and_profit() {
        let medicines = vec![medicine("m1", 2, 10)];
        let invoices = vec![
            invoice(
                vec![LineItem::new("Medicine m1", Some("m1".into()), 3, Money::from_rupees(15))],
                PaymentStatus::Paid,
            ),
            invoice(
                vec![LineItem::new("Walk-in item", None, 1, Money::from_rupees(30))],
                PaymentStatus::Pending,
            ),
            invoice(
                vec![LineItem::new("Deleted", Some("gone".into()), 1, Money::from_rupees(8))],
                PaymentStatus::PartiallyPaid,
            ),
        ];

        let report = DashboardReport::compute(&medicines, &invoices, 10);
        assert_eq!(report.total_sales, Money::from_rupees(83));
        assert_eq!(report.paid_amount, Money::from_rupees(45));
        assert_eq!(report.pending_amount, Money::from_rupees(30));
        assert_eq!(report.total_profit, Money::from_rupees(15));
    }

    #[test]
    fn test_profit_uses_current_cost_price() {
        let lines = vec![LineItem::new("Medicine m1", Some("m1".into()), 2, Money::from_rupees(15))];
        let invoices = vec![invoice(lines, PaymentStatus::Paid)];

        let before = DashboardReport::compute(&[medicine("m1", 0, 10)], &invoices, 10);
        let after = DashboardReport::compute(&[medicine("m1", 0, 20)], &invoices, 10);

        assert_eq!(before.total_profit, Money::from_rupees(10));
        assert_eq!(after.total_profit, Money::from_rupees(-10));
    }
}
