//! # Domain Types
//!
//! The document shapes stored by the back-office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Medicine     │   │     Invoice     │   │    LineItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  name           │       │
//! │  │  name / type    │   │  from / to      │◄──│  medicineId?    │       │
//! │  │  price (cost)   │   │  medicines[]    │   │  quantity       │       │
//! │  │  sellingPrice   │   │  total / paid   │   │  price (sell)   │       │
//! │  │  stock          │   │  paymentStatus  │   │  sellHistory?   │       │
//! │  │  history[]      │   │  paymentMode    │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  MedicineType   │   │ PaymentStatus   │   │  PaymentMode    │       │
//! │  │ MedicineCategory│   │  Pending        │   │  Cash           │       │
//! │  │  id, name       │   │  Partially Paid │   │  Online         │       │
//! │  └─────────────────┘   │  Paid           │   │  Card           │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stored Field Names
//! Field names and enum strings match the documents already in the store
//! (`sellingPrice`, `paymentStatus: "Partially Paid"`, ...). Ids are kept
//! outside the document body by the store and injected on read.
//!
//! ## Weak References
//! `LineItem::medicine_id` is a lookup key only. Deleting a medicine leaves
//! past invoices untouched and nothing enforces that the id still resolves.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::collections;
use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Stored Counts
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCount {
    Whole(i64),
    Fractional(f64),
    Text(String),
}

/// Reads a unit count written as a number (`3`, `3.0`) or as text (`"3"`).
///
/// The web invoice form saved quantity inputs without converting them, so
/// older invoice lines hold text.
fn deserialize_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match StoredCount::deserialize(deserializer)? {
        StoredCount::Whole(n) => Ok(n),
        StoredCount::Fractional(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
            Ok(v as i64)
        }
        StoredCount::Fractional(v) => Err(de::Error::invalid_value(
            de::Unexpected::Float(v),
            &"a whole number",
        )),
        StoredCount::Text(text) => text.trim().parse().map_err(|_| {
            de::Error::invalid_value(de::Unexpected::Str(&text), &"a whole number")
        }),
    }
}

// =============================================================================
// History
// =============================================================================

/// One line of a medicine's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HistoryEntry {
    /// Human-readable description ("Added 10 more items of X to stock").
    pub action: String,

    /// When it happened. New entries hold RFC 3339; entries written by the
    /// old web UI hold locale strings and are kept verbatim.
    pub date: String,
}

impl HistoryEntry {
    pub fn new(action: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            action: action.into(),
            date: at.to_rfc3339(),
        }
    }
}

/// Append-only audit trail of a medicine.
///
/// `append` returns a new sequence instead of mutating in place, so two
/// in-flight operations holding the same snapshot never alias each other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct History(Vec<HistoryEntry>);

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this history with `entry` appended at the end.
    #[must_use]
    pub fn append(&self, entry: HistoryEntry) -> History {
        let mut entries = Vec::with_capacity(self.0.len() + 1);
        entries.extend_from_slice(&self.0);
        entries.push(entry);
        History(entries)
    }

    /// Entries in insertion order (most recent last).
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.0
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.0.last()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.0.iter()
    }
}

impl From<Vec<HistoryEntry>> for History {
    fn from(entries: Vec<HistoryEntry>) -> Self {
        History(entries)
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Medicine
// =============================================================================

/// A medicine held in inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    /// Document id (not part of the stored body).
    #[serde(default)]
    pub id: String,

    pub name: String,

    /// Category name (free text, picked from `medicine_categories`).
    #[serde(default)]
    pub category: String,

    /// Type name ("Tablet", "Syrup", ...), picked from `medicine_types`.
    #[serde(rename = "type", default)]
    pub medicine_type: String,

    /// Strength label ("500mg").
    #[serde(default)]
    pub power: String,

    /// Cost price per unit.
    #[ts(type = "number")]
    pub price: Money,

    /// Default selling price per unit.
    #[serde(default)]
    #[ts(type = "number")]
    pub selling_price: Money,

    /// Quantity on hand.
    #[serde(deserialize_with = "deserialize_count")]
    pub stock: i64,

    #[serde(default)]
    pub history: History,
}

impl Medicine {
    /// Value of the stock on hand at cost price.
    #[inline]
    pub fn inventory_value(&self) -> Money {
        self.price.multiply_quantity(self.stock)
    }

    #[inline]
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock < threshold
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Payment state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentStatus {
    /// Nothing paid yet.
    Pending,
    /// Some but not all of the total paid.
    #[serde(rename = "Partially Paid")]
    PartiallyPaid,
    /// Fully paid.
    Paid,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [
        PaymentStatus::Pending,
        PaymentStatus::PartiallyPaid,
        PaymentStatus::Paid,
    ];

    /// The exact string stored in `paymentStatus`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::PartiallyPaid => "Partially Paid",
            PaymentStatus::Paid => "Paid",
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; accepts `partially-paid` and `partially_paid` for
/// command-line use.
impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "partially paid" => Ok(PaymentStatus::PartiallyPaid),
            "paid" => Ok(PaymentStatus::Paid),
            _ => Err(ValidationError::NotAllowed {
                field: "paymentStatus".to_string(),
                allowed: Self::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Payment Mode
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMode {
    Cash,
    Online,
    Card,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 3] = [PaymentMode::Cash, PaymentMode::Online, PaymentMode::Card];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Online => "Online",
            PaymentMode::Card => "Card",
        }
    }
}

impl Default for PaymentMode {
    fn default() -> Self {
        PaymentMode::Cash
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMode::Cash),
            "online" => Ok(PaymentMode::Online),
            "card" => Ok(PaymentMode::Card),
            _ => Err(ValidationError::NotAllowed {
                field: "paymentMode".to_string(),
                allowed: Self::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// Seller or buyer details printed on an invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Party {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

impl Party {
    pub fn new(name: impl Into<String>, phone: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }
}

/// One medicine line on an invoice.
///
/// Name and price are frozen at sale time; later edits to the medicine do
/// not change past invoices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,

    /// Weak reference to the medicine. Lines without one do not move stock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub medicine_id: Option<String>,

    #[serde(deserialize_with = "deserialize_count")]
    pub quantity: i64,

    /// Selling price per unit.
    #[ts(type = "number")]
    pub price: Money,

    /// Audit note written when the invoice was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub sell_history: Option<String>,
}

impl LineItem {
    pub fn new(
        name: impl Into<String>,
        medicine_id: Option<String>,
        quantity: i64,
        price: Money,
    ) -> Self {
        Self {
            name: name.into(),
            medicine_id,
            quantity,
            price,
            sell_history: None,
        }
    }

    /// quantity × selling price.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

/// A sales invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Document id (not part of the stored body).
    #[serde(default)]
    pub id: String,

    pub from: Party,
    pub to: Party,

    /// Line items, stored under the historical field name `medicines`.
    #[serde(default)]
    pub medicines: Vec<LineItem>,

    /// Σ quantity × price, stored redundantly.
    #[ts(type = "number")]
    pub total: Money,

    #[serde(default)]
    #[ts(type = "number")]
    pub paid_amount: Money,

    /// total − paid. Negative when overpaid.
    #[serde(default)]
    #[ts(type = "number")]
    pub remaining_amount: Money,

    #[serde(default)]
    pub payment_status: PaymentStatus,

    #[serde(default)]
    pub payment_mode: PaymentMode,

    /// Creation time.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// Attached photo of a paper bill (data URL or storage link).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub scanned_bill: Option<String>,
}

// =============================================================================
// Lookup Lists
// =============================================================================

/// A named entry in one of the lookup collections.
///
/// Lets a single repository and service serve both medicine types and
/// medicine categories.
pub trait LookupEntry:
    Clone + Send + Sync + Serialize + for<'de> Deserialize<'de> + 'static
{
    /// Collection the entries live in.
    const COLLECTION: &'static str;

    /// Label used in messages ("Medicine Type").
    const LABEL: &'static str;

    fn new(id: impl Into<String>, name: impl Into<String>) -> Self;

    fn id(&self) -> &str;

    fn name(&self) -> &str;
}

/// A medicine form (Tablet, Syrup, Injection, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MedicineType {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

/// A therapeutic category (Antibiotic, Analgesic, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MedicineCategory {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

impl LookupEntry for MedicineType {
    const COLLECTION: &'static str = collections::MEDICINE_TYPES;
    const LABEL: &'static str = "Medicine Type";

    fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl LookupEntry for MedicineCategory {
    const COLLECTION: &'static str = collections::MEDICINE_CATEGORIES;
    const LABEL: &'static str = "Medicine Category";

    fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
