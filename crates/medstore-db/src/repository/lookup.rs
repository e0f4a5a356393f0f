//! Lookup list repository, shared by medicine types and categories.

use std::marker::PhantomData;

use serde::Serialize;
use tracing::debug;

use medstore_core::LookupEntry;

use crate::document::{encode, Filter};
use crate::error::{DbError, DbResult};
use crate::store::SharedStore;

#[derive(Serialize)]
struct NamePatch<'a> {
    name: &'a str,
}

/// Repository over `T::COLLECTION`.
pub struct LookupRepository<T> {
    store: SharedStore,
    _entry: PhantomData<fn() -> T>,
}

impl<T> Clone for LookupRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entry: PhantomData,
        }
    }
}

impl<T: LookupEntry> LookupRepository<T> {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            _entry: PhantomData,
        }
    }

    pub async fn get(&self, id: &str) -> DbResult<T> {
        match self.store.get(T::COLLECTION, id).await? {
            Some(doc) => doc.decode(),
            None => Err(DbError::not_found(T::COLLECTION, id)),
        }
    }

    /// All entries, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<T>> {
        let docs = self.store.query(T::COLLECTION, &Filter::all()).await?;
        let mut entries = docs
            .iter()
            .map(|doc| doc.decode())
            .collect::<DbResult<Vec<T>>>()?;
        entries.sort_by_key(|e| e.name().to_lowercase());
        Ok(entries)
    }

    /// Stores a new entry and returns it with its generated id.
    pub async fn add(&self, name: &str) -> DbResult<T> {
        debug!(collection = T::COLLECTION, name = %name, "Adding lookup entry");
        let id = self
            .store
            .add(T::COLLECTION, encode(&NamePatch { name })?)
            .await?;
        Ok(T::new(id, name))
    }

    pub async fn rename(&self, id: &str, name: &str) -> DbResult<()> {
        debug!(collection = T::COLLECTION, id = %id, name = %name, "Renaming lookup entry");
        self.store
            .update(T::COLLECTION, id, encode(&NamePatch { name })?)
            .await
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(collection = T::COLLECTION, id = %id, "Deleting lookup entry");
        self.store.delete(T::COLLECTION, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::memory_store;
    use medstore_core::{MedicineCategory, MedicineType};

    #[tokio::test]
    async fn test_types_and_categories_are_separate() {
        let (_, store) = memory_store();
        let types = LookupRepository::<MedicineType>::new(store.clone());
        let categories = LookupRepository::<MedicineCategory>::new(store);

        types.add("Tablet").await.unwrap();
        types.add("Syrup").await.unwrap();
        categories.add("Antibiotic").await.unwrap();

        let names: Vec<_> = types.list().await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Syrup", "Tablet"]);
        assert_eq!(categories.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let (_, store) = memory_store();
        let types = LookupRepository::<MedicineType>::new(store);

        let tablet = types.add("Tablet").await.unwrap();
        types.rename(&tablet.id, "Tablets").await.unwrap();
        assert_eq!(types.get(&tablet.id).await.unwrap().name, "Tablets");

        types.delete(&tablet.id).await.unwrap();
        assert!(matches!(types.get(&tablet.id).await, Err(DbError::NotFound { .. })));
    }
}
