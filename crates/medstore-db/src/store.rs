//! # Document Store
//!
//! The one boundary between the back-office and its data.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         DocumentStore                                   │
//! │                                                                         │
//! │   get / query / add / set / update / delete        changes()            │
//! │        │                                               │                │
//! │        ▼                                               ▼                │
//! │  ┌─────────────┐   ┌─────────────┐       broadcast::Receiver<ChangeEvent>│
//! │  │ MemoryStore │   │  Database   │               │                      │
//! │  │  (RwLock)   │   │  (SQLite)   │               ▼                      │
//! │  └─────────────┘   └─────────────┘       subscribe(collection, filter)  │
//! │                                                  │                      │
//! │                                                  ▼ mpsc                 │
//! │                                          Subscription::next()           │
//! │                                          initial Snapshot, then a full  │
//! │                                          Snapshot after every change    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes are atomic per document only. Nothing here spans documents.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::document::{ChangeEvent, Document, Fields, Filter};
use crate::error::DbResult;

/// Capacity of the change-event broadcast channel in each store.
pub const CHANGE_BUFFER: usize = 256;

/// Snapshots a subscriber may fall behind by before the listener waits.
const SNAPSHOT_BUFFER: usize = 16;

// =============================================================================
// Store Trait
// =============================================================================

/// Named collections of JSON documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches one document, `None` when it does not exist.
    async fn get(&self, collection: &str, id: &str) -> DbResult<Option<Document>>;

    /// All documents in `collection` matching `filter`, ordered by id.
    async fn query(&self, collection: &str, filter: &Filter) -> DbResult<Vec<Document>>;

    /// Stores a new document under a generated id and returns the id.
    async fn add(&self, collection: &str, fields: Fields) -> DbResult<String>;

    /// Creates or replaces the document with a caller-chosen id.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> DbResult<()>;

    /// Merges top-level fields into an existing document.
    ///
    /// Fails with `DbError::NotFound` when the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> DbResult<()>;

    /// Removes a document. Removing a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> DbResult<()>;

    /// Receiver of every change made through this store from now on.
    fn changes(&self) -> broadcast::Receiver<ChangeEvent>;
}

/// How services hold a store.
pub type SharedStore = Arc<dyn DocumentStore>;

// =============================================================================
// Subscriptions
// =============================================================================

/// Full contents of a collection (after filtering) at one point in time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub collection: String,
    pub documents: Vec<Document>,
}

/// A live view of one collection.
///
/// Dropping the subscription, or calling [`Subscription::cancel`], stops the
/// listener task. Holders are expected to release it on teardown.
#[derive(Debug)]
pub struct Subscription {
    collection: String,
    receiver: mpsc::Receiver<DbResult<Snapshot>>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Waits for the next snapshot. `None` once the subscription has ended.
    ///
    /// A failed re-read is delivered as `Err` and the subscription carries on.
    pub async fn next(&mut self) -> Option<DbResult<Snapshot>> {
        self.receiver.recv().await
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Releases the listener.
    pub fn cancel(self) {
        debug!(collection = %self.collection, "Subscription cancelled");
        // Drop aborts the task.
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Subscribes to a collection.
///
/// Delivers an initial snapshot, then a fresh full snapshot after each
/// change to `collection`. A burst of changes that arrives while a snapshot
/// is being read is folded into one snapshot.
///
/// Must be called from within a Tokio runtime.
pub fn subscribe(store: SharedStore, collection: impl Into<String>, filter: Filter) -> Subscription {
    let collection = collection.into();
    let (tx, receiver) = mpsc::channel(SNAPSHOT_BUFFER);

    // Listen before the first read so no change slips in between.
    let mut changes = store.changes();
    let task_collection = collection.clone();

    let task = tokio::spawn(async move {
        let collection = task_collection;
        debug!(collection = %collection, "Subscription started");

        if !send_snapshot(store.as_ref(), &collection, &filter, &tx).await {
            return;
        }

        loop {
            match changes.recv().await {
                Ok(event) if event.collection == collection => {}
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(collection = %collection, skipped, "Subscription lagged, resyncing");
                }
                Err(RecvError::Closed) => break,
            }

            // Fold any queued events into this snapshot.
            loop {
                match changes.try_recv() {
                    Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }

            if !send_snapshot(store.as_ref(), &collection, &filter, &tx).await {
                break;
            }
        }

        debug!(collection = %collection, "Subscription ended");
    });

    Subscription {
        collection,
        receiver,
        task,
    }
}

/// Reads and forwards one snapshot. Returns false once the receiver is gone.
async fn send_snapshot(
    store: &dyn DocumentStore,
    collection: &str,
    filter: &Filter,
    tx: &mpsc::Sender<DbResult<Snapshot>>,
) -> bool {
    let result = store
        .query(collection, filter)
        .await
        .map(|documents| Snapshot {
            collection: collection.to_string(),
            documents,
        });

    if let Err(e) = &result {
        error!(collection = %collection, error = %e, "Snapshot read failed");
    }

    tx.send(result).await.is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::into_fields;
    use crate::memory::MemoryStore;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn next_snapshot(sub: &mut Subscription) -> Snapshot {
        timeout(Duration::from_secs(5), sub.next())
            .await
            .expect("snapshot in time")
            .expect("subscription open")
            .expect("snapshot read")
    }

    #[tokio::test]
    async fn test_initial_snapshot_then_updates() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store
            .set("medicine_types", "t1", into_fields(json!({ "name": "Tablet" })).unwrap())
            .await
            .unwrap();

        let mut sub = subscribe(store.clone(), "medicine_types", Filter::all());
        assert_eq!(next_snapshot(&mut sub).await.documents.len(), 1);

        store
            .add("medicine_types", into_fields(json!({ "name": "Syrup" })).unwrap())
            .await
            .unwrap();

        // Folded bursts may skip intermediate states, never the final one.
        let mut seen = 0;
        while seen != 2 {
            seen = next_snapshot(&mut sub).await.documents.len();
        }
    }

    #[tokio::test]
    async fn test_ignores_other_collections() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut sub = subscribe(store.clone(), "invoices", Filter::all());
        assert!(next_snapshot(&mut sub).await.documents.is_empty());

        store
            .add("medicine_types", into_fields(json!({ "name": "Tablet" })).unwrap())
            .await
            .unwrap();

        let quiet = timeout(Duration::from_millis(100), sub.next()).await;
        assert!(quiet.is_err());
    }

    #[tokio::test]
    async fn test_filtered_snapshot() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        for status in ["Paid", "Pending", "Paid"] {
            store
                .add("invoices", into_fields(json!({ "paymentStatus": status })).unwrap())
                .await
                .unwrap();
        }

        let mut sub = subscribe(store, "invoices", Filter::eq("paymentStatus", "Paid"));
        assert_eq!(next_snapshot(&mut sub).await.documents.len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_stops_listener() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut sub = subscribe(store, "invoices", Filter::all());
        next_snapshot(&mut sub).await;
        assert!(sub.is_active());
        sub.cancel();
    }
}
