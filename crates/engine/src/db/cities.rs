//! Repository for the city reference directory.

use pickupmart_core::CityId;

use super::{Database, StorageError};
use crate::models::City;

/// Repository for city directory operations.
pub struct CityRepository<'a> {
    db: &'a Database,
}

impl<'a> CityRepository<'a> {
    /// Create a new city repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a city.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a city with the same name
    /// (case-insensitive) already exists.
    pub async fn insert(&self, city: City) -> Result<City, StorageError> {
        let mut tables = self.db.write().await;
        if tables
            .cities
            .values()
            .any(|existing| existing.name.eq_ignore_ascii_case(&city.name))
        {
            return Err(StorageError::Conflict(format!(
                "city {} already exists",
                city.name
            )));
        }
        tables.cities.insert(city.id, city.clone());
        Ok(city)
    }

    /// Get a city by id.
    pub async fn get(&self, id: CityId) -> Option<City> {
        self.db.read().await.cities.get(&id).cloned()
    }

    /// Resolve a city by name, case-insensitively.
    ///
    /// Profile city names come from free-text admin edits and import
    /// spreadsheets, so lookup tolerates casing differences.
    pub async fn find_by_name(&self, name: &str) -> Option<City> {
        self.db
            .read()
            .await
            .cities
            .values()
            .find(|city| city.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// List all cities.
    pub async fn list(&self) -> Vec<City> {
        let mut cities: Vec<_> = self.db.read().await.cities.values().cloned().collect();
        cities.sort_by(|a, b| a.name.cmp(&b.name));
        cities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_by_name_is_case_insensitive() {
        let db = Database::new();
        db.cities()
            .insert(City {
                id: CityId::generate(),
                name: "Hyderabad".to_string(),
                active: true,
            })
            .await
            .expect("inserts");

        assert!(db.cities().find_by_name("hyderabad").await.is_some());
        assert!(db.cities().find_by_name("HYDERABAD").await.is_some());
        assert!(db.cities().find_by_name("Secunderabad").await.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let db = Database::new();
        let city = City {
            id: CityId::generate(),
            name: "Pune".to_string(),
            active: true,
        };
        db.cities().insert(city).await.expect("first insert");

        let duplicate = City {
            id: CityId::generate(),
            name: "pune".to_string(),
            active: false,
        };
        assert!(matches!(
            db.cities().insert(duplicate).await,
            Err(StorageError::Conflict(_))
        ));
    }
}
