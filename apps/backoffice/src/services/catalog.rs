//! # Catalog
//!
//! Medicine records and the type and category lookup lists.
//!
//! Stock is set once here, when a medicine is added. After that it only
//! moves through the [`StockLedger`](crate::services::StockLedger).

use chrono::Utc;
use tracing::info;

use medstore_core::stock::{added_to_inventory, deleted_from_inventory, updated_details};
use medstore_core::validation::{validate_lookup_name, validate_name, validate_price, validate_stock_level};
use medstore_core::{
    History, HistoryEntry, LookupEntry, Medicine, MedicineCategory, MedicineType, Money,
};
use medstore_db::{LookupRepository, MedicineRepository, SharedStore};

use crate::error::BackofficeResult;

/// Form input for a new medicine.
#[derive(Debug, Clone, Default)]
pub struct NewMedicine {
    pub name: String,
    pub category: String,
    pub medicine_type: String,
    pub power: String,
    /// Cost price per unit.
    pub price: Money,
    pub selling_price: Money,
    /// Opening stock.
    pub stock: i64,
}

/// Editable fields of an existing medicine. No stock.
#[derive(Debug, Clone, Default)]
pub struct MedicineDetails {
    pub name: String,
    pub category: String,
    pub medicine_type: String,
    pub power: String,
    pub price: Money,
    pub selling_price: Money,
}

impl MedicineDetails {
    fn validate(&self) -> BackofficeResult<()> {
        validate_name("name", &self.name)?;
        validate_price("price", self.price)?;
        validate_price("sellingPrice", self.selling_price)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct Catalog {
    medicines: MedicineRepository,
    types: LookupRepository<MedicineType>,
    categories: LookupRepository<MedicineCategory>,
}

impl Catalog {
    pub fn new(store: SharedStore) -> Self {
        Self {
            medicines: MedicineRepository::new(store.clone()),
            types: LookupRepository::new(store.clone()),
            categories: LookupRepository::new(store),
        }
    }

    // =========================================================================
    // Medicines
    // =========================================================================

    /// Stores a new medicine with its opening history entry.
    pub async fn add_medicine(&self, input: NewMedicine) -> BackofficeResult<Medicine> {
        validate_name("name", &input.name)?;
        validate_price("price", input.price)?;
        validate_price("sellingPrice", input.selling_price)?;
        validate_stock_level(input.stock)?;

        let name = input.name.trim().to_string();
        let history = History::new().append(HistoryEntry::new(
            added_to_inventory(&name, input.stock),
            Utc::now(),
        ));

        let mut medicine = Medicine {
            id: String::new(),
            name,
            category: input.category,
            medicine_type: input.medicine_type,
            power: input.power,
            price: input.price,
            selling_price: input.selling_price,
            stock: input.stock,
            history,
        };
        medicine.id = self.medicines.insert(&medicine).await?;

        info!(medicine_id = %medicine.id, name = %medicine.name, stock = medicine.stock, "Medicine added");
        Ok(medicine)
    }

    /// Rewrites the descriptive fields and prices. Stock is left alone.
    pub async fn update_medicine(&self, id: &str, details: MedicineDetails) -> BackofficeResult<Medicine> {
        details.validate()?;

        let mut medicine = self.medicines.get(id).await?;
        medicine.name = details.name.trim().to_string();
        medicine.category = details.category;
        medicine.medicine_type = details.medicine_type;
        medicine.power = details.power;
        medicine.price = details.price;
        medicine.selling_price = details.selling_price;
        medicine.history = medicine
            .history
            .append(HistoryEntry::new(updated_details(&medicine.name), Utc::now()));

        self.medicines.update_details(&medicine).await?;

        info!(medicine_id = %id, "Medicine details updated");
        Ok(medicine)
    }

    /// Records the deletion in history, then removes the document.
    ///
    /// Invoices that reference the medicine are not touched.
    pub async fn delete_medicine(&self, id: &str) -> BackofficeResult<()> {
        let medicine = self.medicines.get(id).await?;
        let history = medicine
            .history
            .append(HistoryEntry::new(deleted_from_inventory(&medicine.name), Utc::now()));

        self.medicines.set_history(id, &history).await?;
        self.medicines.delete(id).await?;

        info!(medicine_id = %id, name = %medicine.name, "Medicine deleted");
        Ok(())
    }

    pub async fn get_medicine(&self, id: &str) -> BackofficeResult<Medicine> {
        Ok(self.medicines.get(id).await?)
    }

    /// All medicines, sorted by name.
    pub async fn list_medicines(&self) -> BackofficeResult<Vec<Medicine>> {
        Ok(self.medicines.list().await?)
    }

    // =========================================================================
    // Types & Categories
    // =========================================================================

    pub async fn add_type(&self, name: &str) -> BackofficeResult<MedicineType> {
        add_entry(&self.types, name).await
    }

    pub async fn rename_type(&self, id: &str, name: &str) -> BackofficeResult<()> {
        rename_entry(&self.types, id, name).await
    }

    pub async fn delete_type(&self, id: &str) -> BackofficeResult<()> {
        Ok(self.types.delete(id).await?)
    }

    pub async fn list_types(&self) -> BackofficeResult<Vec<MedicineType>> {
        Ok(self.types.list().await?)
    }

    pub async fn add_category(&self, name: &str) -> BackofficeResult<MedicineCategory> {
        add_entry(&self.categories, name).await
    }

    pub async fn rename_category(&self, id: &str, name: &str) -> BackofficeResult<()> {
        rename_entry(&self.categories, id, name).await
    }

    pub async fn delete_category(&self, id: &str) -> BackofficeResult<()> {
        Ok(self.categories.delete(id).await?)
    }

    pub async fn list_categories(&self) -> BackofficeResult<Vec<MedicineCategory>> {
        Ok(self.categories.list().await?)
    }
}

async fn add_entry<T: LookupEntry>(repo: &LookupRepository<T>, name: &str) -> BackofficeResult<T> {
    validate_lookup_name(T::LABEL, name)?;
    let entry = repo.add(name.trim()).await?;
    info!(collection = T::COLLECTION, id = %entry.id(), name = %entry.name(), "Lookup entry added");
    Ok(entry)
}

async fn rename_entry<T: LookupEntry>(
    repo: &LookupRepository<T>,
    id: &str,
    name: &str,
) -> BackofficeResult<()> {
    validate_lookup_name(T::LABEL, name)?;
    repo.rename(id, name.trim()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApiError, BackofficeError};
    use crate::services::test_support::memory_store;
    use crate::services::StockLedger;

    fn paracetamol() -> NewMedicine {
        NewMedicine {
            name: "Paracetamol".into(),
            category: "Analgesic".into(),
            medicine_type: "Tablet".into(),
            power: "500mg".into(),
            price: Money::from_rupees(10),
            selling_price: Money::from_rupees(15),
            stock: 5,
        }
    }

    #[tokio::test]
    async fn test_add_medicine_records_opening_entry() {
        let (_, store) = memory_store();
        let catalog = Catalog::new(store);

        let added = catalog.add_medicine(paracetamol()).await.unwrap();
        let stored = catalog.get_medicine(&added.id).await.unwrap();

        assert_eq!(stored.stock, 5);
        assert_eq!(stored.history.len(), 1);
        assert_eq!(
            stored.history.entries()[0].action,
            "Added Paracetamol to inventory with 5 items"
        );
    }

    #[tokio::test]
    async fn test_add_medicine_validation() {
        let (_, store) = memory_store();
        let catalog = Catalog::new(store);

        let mut nameless = paracetamol();
        nameless.name = " ".into();
        assert!(matches!(
            catalog.add_medicine(nameless).await,
            Err(BackofficeError::Validation(_))
        ));

        let mut negative = paracetamol();
        negative.stock = -1;
        assert!(matches!(
            catalog.add_medicine(negative).await,
            Err(BackofficeError::Validation(_))
        ));

        let mut free = paracetamol();
        free.price = Money::zero();
        free.selling_price = Money::zero();
        assert!(catalog.add_medicine(free).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_keeps_stock_and_appends_history() {
        let (_, store) = memory_store();
        let catalog = Catalog::new(store.clone());
        let added = catalog.add_medicine(paracetamol()).await.unwrap();
        StockLedger::new(store).restock(&added.id, 7).await.unwrap();

        let updated = catalog
            .update_medicine(
                &added.id,
                MedicineDetails {
                    name: "Panadol".into(),
                    category: "Analgesic".into(),
                    medicine_type: "Tablet".into(),
                    power: "500mg".into(),
                    price: Money::from_rupees(11),
                    selling_price: Money::from_rupees(16),
                },
            )
            .await
            .unwrap();

        let stored = catalog.get_medicine(&added.id).await.unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.stock, 12);
        assert_eq!(stored.price, Money::from_rupees(11));
        assert_eq!(stored.history.len(), 3);
        assert_eq!(stored.history.last().unwrap().action, "Updated details of Panadol");
    }

    #[tokio::test]
    async fn test_delete_medicine() {
        let (_, store) = memory_store();
        let catalog = Catalog::new(store);
        let added = catalog.add_medicine(paracetamol()).await.unwrap();

        catalog.delete_medicine(&added.id).await.unwrap();

        assert!(matches!(
            catalog.get_medicine(&added.id).await,
            Err(BackofficeError::NotFound { .. })
        ));
        assert!(matches!(
            catalog.delete_medicine(&added.id).await,
            Err(BackofficeError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_lookup_names_required() {
        let (_, store) = memory_store();
        let catalog = Catalog::new(store);

        let err = catalog.add_type("").await.unwrap_err();
        assert_eq!(ApiError::from(err).message, "Medicine Type name is required");

        let err = catalog.add_category("   ").await.unwrap_err();
        assert_eq!(ApiError::from(err).message, "Medicine Category name is required");

        assert!(catalog.list_types().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_lifecycle() {
        let (_, store) = memory_store();
        let catalog = Catalog::new(store);

        let syrup = catalog.add_type(" Syrup ").await.unwrap();
        catalog.add_type("Capsule").await.unwrap();
        catalog.add_category("Antibiotic").await.unwrap();
        assert_eq!(syrup.name, "Syrup");

        catalog.rename_type(&syrup.id, "Syrups").await.unwrap();
        let names: Vec<_> = catalog
            .list_types()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Capsule", "Syrups"]);

        catalog.delete_type(&syrup.id).await.unwrap();
        assert_eq!(catalog.list_types().await.unwrap().len(), 1);
        assert_eq!(catalog.list_categories().await.unwrap().len(), 1);
    }
}
