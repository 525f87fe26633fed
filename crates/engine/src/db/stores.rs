//! Repository for operational stores.

use pickupmart_core::SubjectId;

use super::{Database, StorageError};
use crate::models::Store;

/// Repository for store operations.
///
/// Enforces at write time that `manager_id` resolves to an existing
/// identity: a store row never exists without a resolvable manager.
pub struct StoreRepository<'a> {
    db: &'a Database,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a new store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id already exists or the
    /// manager identity is missing.
    pub async fn insert(&self, store: Store) -> Result<Store, StorageError> {
        let mut tables = self.db.write().await;
        if tables.stores.contains_key(&store.id) {
            return Err(StorageError::Conflict(format!(
                "store {} already exists",
                store.id
            )));
        }
        if !tables.identities.contains_key(&store.manager_id) {
            return Err(StorageError::Conflict(format!(
                "store {} manager {} has no identity",
                store.id, store.manager_id
            )));
        }
        if !tables.cities.contains_key(&store.city_id) {
            return Err(StorageError::Conflict(format!(
                "store {} references unknown city {}",
                store.id, store.city_id
            )));
        }
        tables.stores.insert(store.id, store.clone());
        Ok(store)
    }

    /// Replace an existing store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the store doesn't exist and
    /// `StorageError::Conflict` if the manager identity is missing.
    pub async fn update(&self, store: Store) -> Result<Store, StorageError> {
        let mut tables = self.db.write().await;
        if !tables.stores.contains_key(&store.id) {
            return Err(StorageError::NotFound);
        }
        if !tables.identities.contains_key(&store.manager_id) {
            return Err(StorageError::Conflict(format!(
                "store {} manager {} has no identity",
                store.id, store.manager_id
            )));
        }
        tables.stores.insert(store.id, store.clone());
        Ok(store)
    }

    /// Get a store by id.
    pub async fn get(&self, id: SubjectId) -> Option<Store> {
        self.db.read().await.stores.get(&id).cloned()
    }

    /// List all stores.
    pub async fn list(&self) -> Vec<Store> {
        let mut stores: Vec<_> = self.db.read().await.stores.values().cloned().collect();
        stores.sort_by_key(|store| store.id);
        stores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{City, Identity};
    use pickupmart_core::{CityId, Email};

    #[tokio::test]
    async fn test_insert_requires_manager_identity() {
        let db = Database::new();
        let city = City {
            id: CityId::generate(),
            name: "Chennai".to_string(),
            active: true,
        };
        db.cities().insert(city.clone()).await.expect("city");

        let id = SubjectId::generate();
        let store = Store {
            id,
            name: "Corner Kirana".to_string(),
            active: true,
            manager_id: id,
            city_id: city.id,
            address: "12 Mount Road".to_string(),
            image: None,
        };

        // No identity yet: refused.
        assert!(matches!(
            db.stores().insert(store.clone()).await,
            Err(StorageError::Conflict(_))
        ));

        let identity = Identity::provisioned_merchant(
            id,
            Email::parse("kirana@example.com").expect("email"),
            "R. Kumar".to_string(),
        );
        db.identities().insert(identity).await.expect("identity");
        db.stores().insert(store).await.expect("now inserts");
    }
}
