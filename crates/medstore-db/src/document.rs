//! # Documents
//!
//! Schemaless JSON documents addressed by `(collection, id)`.
//!
//! ```text
//! Document { id: "m1", fields: { "name": "Paracetamol", "stock": 5, ... } }
//!            │                 │
//!            │                 └── stored body (no id inside)
//!            └── lives beside the body, injected by decode()
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DbError, DbResult};

/// Top-level fields of a document body.
pub type Fields = Map<String, Value>;

// =============================================================================
// Document
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Decodes into a typed shape, with the document id set as its `id` field.
    pub fn decode<T: DeserializeOwned>(&self) -> DbResult<T> {
        let mut body = self.fields.clone();
        body.insert("id".to_string(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(body)).map_err(|e| {
            DbError::Serialization(format!("document {}: {}", self.id, e))
        })
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Encodes a typed value as a document body. Any `id` field is dropped.
pub fn encode<T: Serialize>(value: &T) -> DbResult<Fields> {
    let mut fields = into_fields(serde_json::to_value(value)?)?;
    fields.remove("id");
    Ok(fields)
}

/// Unwraps a JSON object, e.g. one built with `serde_json::json!`.
pub fn into_fields(value: Value) -> DbResult<Fields> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(DbError::Serialization(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Conjunction of top-level equality clauses. The empty filter matches all.
///
/// ```rust
/// use medstore_db::Filter;
///
/// let filter = Filter::eq("paymentStatus", "Pending").and_eq("paymentMode", "Cash");
/// assert_eq!(filter.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and_eq(field, value)
    }

    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        self.clauses
            .iter()
            .all(|(field, expected)| fields.get(field) == Some(expected))
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }
}

// =============================================================================
// Change Events
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// Emitted by a store after every successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: String,
    pub id: String,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(collection: &str, id: &str, kind: ChangeKind) -> Self {
        Self {
            collection: collection.to_string(),
            id: id.to_string(),
            kind,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use medstore_core::{MedicineType, Money};
    use serde_json::json;

    #[test]
    fn test_encode_strips_id_and_decode_restores_it() {
        let entry = MedicineType {
            id: "t1".into(),
            name: "Tablet".into(),
        };
        let fields = encode(&entry).unwrap();
        assert!(!fields.contains_key("id"));

        let decoded: MedicineType = Document::new("t9", fields).decode().unwrap();
        assert_eq!(decoded.id, "t9");
        assert_eq!(decoded.name, "Tablet");
    }

    #[test]
    fn test_decode_reports_document_id() {
        let fields = into_fields(json!({ "name": 5 })).unwrap();
        let err = Document::new("bad", fields).decode::<MedicineType>().unwrap_err();
        assert!(err.to_string().contains("document bad"));
    }

    #[test]
    fn test_into_fields_rejects_non_objects() {
        assert!(into_fields(json!([1, 2])).is_err());
        assert!(encode(&Money::from_rupees(3)).is_err());
    }

    #[test]
    fn test_filter_matches_all_clauses() {
        let fields = into_fields(json!({ "paymentStatus": "Pending", "total": 45 })).unwrap();

        assert!(Filter::all().matches(&fields));
        assert!(Filter::eq("paymentStatus", "Pending").matches(&fields));
        assert!(!Filter::eq("paymentStatus", "Pending")
            .and_eq("total", 50)
            .matches(&fields));
        assert!(!Filter::eq("missing", "x").matches(&fields));
    }
}
