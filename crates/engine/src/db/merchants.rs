//! Repository for merchant profiles.

use chrono::Utc;

use pickupmart_core::{Email, SubjectId};

use super::{Database, StorageError, check_email_unique};
use crate::models::MerchantProfile;

/// Repository for merchant profile operations.
pub struct MerchantRepository<'a> {
    db: &'a Database,
}

impl<'a> MerchantRepository<'a> {
    /// Create a new merchant repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a new merchant profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id already exists or the
    /// email is taken by another identity or profile.
    pub async fn insert(&self, profile: MerchantProfile) -> Result<MerchantProfile, StorageError> {
        let mut tables = self.db.write().await;
        if tables.merchants.contains_key(&profile.id) {
            return Err(StorageError::Conflict(format!(
                "merchant profile {} already exists",
                profile.id
            )));
        }
        check_email_unique(&tables, &profile.email, profile.id)?;
        tables.merchants.insert(profile.id, profile.clone());
        Ok(profile)
    }

    /// Replace an existing merchant profile, bumping `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the profile doesn't exist and
    /// `StorageError::Conflict` on an email collision.
    pub async fn update(
        &self,
        mut profile: MerchantProfile,
    ) -> Result<MerchantProfile, StorageError> {
        let mut tables = self.db.write().await;
        if !tables.merchants.contains_key(&profile.id) {
            return Err(StorageError::NotFound);
        }
        check_email_unique(&tables, &profile.email, profile.id)?;
        profile.updated_at = Utc::now();
        tables.merchants.insert(profile.id, profile.clone());
        Ok(profile)
    }

    /// Insert-or-update keyed on id, used by the catalog backfill.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` on an email collision.
    pub async fn upsert(
        &self,
        mut profile: MerchantProfile,
    ) -> Result<MerchantProfile, StorageError> {
        let mut tables = self.db.write().await;
        check_email_unique(&tables, &profile.email, profile.id)?;
        if tables.merchants.contains_key(&profile.id) {
            profile.updated_at = Utc::now();
        }
        tables.merchants.insert(profile.id, profile.clone());
        Ok(profile)
    }

    /// Get a merchant profile by id.
    pub async fn get(&self, id: SubjectId) -> Option<MerchantProfile> {
        self.db.read().await.merchants.get(&id).cloned()
    }

    /// Find a merchant profile by normalized email.
    pub async fn find_by_email(&self, email: &Email) -> Option<MerchantProfile> {
        self.db
            .read()
            .await
            .merchants
            .values()
            .find(|profile| profile.email == *email)
            .cloned()
    }

    /// List all merchant profiles.
    pub async fn list(&self) -> Vec<MerchantProfile> {
        let mut profiles: Vec<_> = self.db.read().await.merchants.values().cloned().collect();
        profiles.sort_by_key(|profile| profile.id);
        profiles
    }

    /// Delete a merchant and everything hanging off its store, in one
    /// guarded operation: store product links first, then the store, the
    /// identity, and finally the profile. Partial cascades are the failure
    /// mode this ordering exists to avoid.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the profile doesn't exist.
    pub async fn delete_cascade(&self, id: SubjectId) -> Result<(), StorageError> {
        let mut tables = self.db.write().await;
        if !tables.merchants.contains_key(&id) {
            return Err(StorageError::NotFound);
        }
        tables.links.retain(|_, link| link.store_id != id);
        tables.stores.remove(&id);
        tables.identities.remove(&id);
        tables.merchants.remove(&id);
        Ok(())
    }
}
