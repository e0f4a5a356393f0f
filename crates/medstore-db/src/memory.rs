//! In-memory document store.
//!
//! Backs the `memory` store backend and every service test. Documents are
//! kept per collection in id order, so `query` is deterministic.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::document::{ChangeEvent, ChangeKind, Document, Fields, Filter};
use crate::error::{DbError, DbResult};
use crate::store::{DocumentStore, CHANGE_BUFFER};

type Collections = HashMap<String, BTreeMap<String, Fields>>;

#[derive(Debug)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    changes: broadcast::Sender<ChangeEvent>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            collections: RwLock::new(HashMap::new()),
            changes,
            offline: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent call fail with `DbError::Unavailable` until
    /// switched back. Simulates a lost connection.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> DbResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn notify(&self, collection: &str, id: &str, kind: ChangeKind) {
        // No receivers is fine.
        let _ = self.changes.send(ChangeEvent::new(collection, id, kind));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> DbResult<Option<Document>> {
        self.check_online()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn query(&self, collection: &str, filter: &Filter) -> DbResult<Vec<Document>> {
        self.check_online()?;
        let collections = self.collections.read().await;
        let documents = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| filter.matches(fields))
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(documents)
    }

    async fn add(&self, collection: &str, fields: Fields) -> DbResult<String> {
        self.check_online()?;
        let id = Uuid::new_v4().to_string();
        {
            let mut collections = self.collections.write().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.clone(), fields);
        }
        debug!(collection = %collection, id = %id, "Document added");
        self.notify(collection, &id, ChangeKind::Added);
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> DbResult<()> {
        self.check_online()?;
        let previous = {
            let mut collections = self.collections.write().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), fields)
        };
        let kind = if previous.is_some() {
            ChangeKind::Modified
        } else {
            ChangeKind::Added
        };
        self.notify(collection, id, kind);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> DbResult<()> {
        self.check_online()?;
        {
            let mut collections = self.collections.write().await;
            let existing = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| DbError::not_found(collection, id))?;
            existing.extend(fields);
        }
        self.notify(collection, id, ChangeKind::Modified);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> DbResult<()> {
        self.check_online()?;
        let removed = {
            let mut collections = self.collections.write().await;
            collections
                .get_mut(collection)
                .and_then(|docs| docs.remove(id))
        };
        if removed.is_some() {
            self.notify(collection, id, ChangeKind::Removed);
        }
        Ok(())
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}
