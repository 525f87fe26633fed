//! One-way backfill from the operational store into the merchant profile.
//!
//! Gives the admin dashboard a current view of stores that were created or
//! edited on the operational side. The sync owns only the fields it maps;
//! admin-owned fields (KYC status, rating) are preserved from the existing
//! profile row.

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, instrument};

use pickupmart_core::{KycStatus, MerchantStatus, SubjectId};

use crate::db::{Database, StorageError};
use crate::models::MerchantProfile;

/// Errors from a store-to-merchant sync.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The store id does not exist.
    #[error("store {0} not found")]
    StoreNotFound(SubjectId),

    /// The store's manager or city could not be resolved. Reported to the
    /// operator; never papered over with a placeholder owner.
    #[error("dependency missing: {0}")]
    DependencyMissing(String),

    /// Underlying storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One-way Store -> MerchantProfile backfill.
#[derive(Debug, Clone)]
pub struct CatalogSyncService {
    db: Database,
}

impl CatalogSyncService {
    /// Create a sync service over the given database.
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Build the merchant profile payload from a store and insert-or-update
    /// it keyed on the shared id.
    ///
    /// Idempotent: repeated calls converge to the same profile state.
    ///
    /// # Errors
    ///
    /// - [`SyncError::StoreNotFound`] if the store doesn't exist.
    /// - [`SyncError::DependencyMissing`] if the store's manager identity
    ///   or city is unresolvable.
    #[instrument(skip(self))]
    pub async fn sync_store_to_merchant(
        &self,
        store_id: SubjectId,
    ) -> Result<MerchantProfile, SyncError> {
        let _guard = self.db.lock_subject(store_id).await;

        let store = self
            .db
            .stores()
            .get(store_id)
            .await
            .ok_or(SyncError::StoreNotFound(store_id))?;

        let Some(manager) = self.db.identities().get(store.manager_id).await else {
            error!(store_id = %store_id, manager_id = %store.manager_id, "store has no manager identity");
            return Err(SyncError::DependencyMissing(format!(
                "store {store_id} has no manager identity"
            )));
        };

        let Some(city) = self.db.cities().get(store.city_id).await else {
            error!(store_id = %store_id, city_id = %store.city_id, "store references unknown city");
            return Err(SyncError::DependencyMissing(format!(
                "store {store_id} references unknown city"
            )));
        };

        let status = if store.active {
            MerchantStatus::Active
        } else {
            MerchantStatus::Inactive
        };

        let profile = match self.db.merchants().get(store_id).await {
            // Update only the fields the sync owns; kyc_status and rating
            // (and everything else admin-authored) are preserved.
            Some(mut existing) => {
                existing.store_name = store.name.clone();
                existing.owner_name = manager.name.clone();
                existing.email = manager.email.clone();
                existing.status = status;
                existing.city = city.name.clone();
                existing.address = store.address.clone();
                existing
            }
            None => {
                let now = Utc::now();
                MerchantProfile {
                    id: store_id,
                    owner_name: manager.name.clone(),
                    email: manager.email.clone(),
                    phone: None,
                    store_name: store.name.clone(),
                    city: city.name.clone(),
                    address: store.address.clone(),
                    geolocation: None,
                    kyc_status: KycStatus::Pending,
                    status,
                    rating: None,
                    photos: store.image.clone().into_iter().collect(),
                    created_at: now,
                    updated_at: now,
                }
            }
        };

        let profile = self.db.merchants().upsert(profile).await?;
        info!(store_id = %store_id, "store backfilled into merchant profile");
        Ok(profile)
    }
}
