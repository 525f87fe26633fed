//! Provisioning reactor: derives and repairs the login identity and the
//! operational store from a merchant profile write.
//!
//! The profile is authoritative for identity fields (owner name, email);
//! the store is authoritative for operational state, so updates project
//! only a fixed field map onto it. The same code path serves the
//! synchronous reaction to a profile write and the manual repair performed
//! by the reconciliation sweep; there is deliberately no second,
//! script-shaped implementation of this propagation.

use thiserror::Error;
use tracing::{error, info, instrument};

use pickupmart_core::SubjectId;

use crate::db::{Database, StorageError};
use crate::models::{Identity, MerchantProfile, Store};

/// Errors from a provisioning pass.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// A reference the derivation depends on (the profile's city) could not
    /// be resolved. Fatal to this operation; nothing is created or changed,
    /// and the caller must surface it to an operator rather than default.
    #[error("dependency missing: {0}")]
    DependencyMissing(String),

    /// Uniqueness violation, e.g. the profile's email already belongs to a
    /// different subject.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Underlying storage failure.
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for ProvisioningError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(message) => Self::Conflict(message),
            StorageError::NotFound => Self::Storage(err),
        }
    }
}

/// The identity and store rows as they stand after a provisioning pass.
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub identity: Identity,
    pub store: Store,
}

/// Derives/repairs Identity and Store rows from a merchant profile.
#[derive(Debug, Clone)]
pub struct ProvisioningReactor {
    db: Database,
}

impl ProvisioningReactor {
    /// Create a reactor over the given database.
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// React to a merchant profile write.
    ///
    /// Holds the per-merchant lock for the whole call, so two concurrent
    /// writes to the same profile id serialize and the identity/store pair
    /// never observes an interleaved partial write. Replaying the same
    /// profile state is a no-op: no duplicate rows, same field values.
    ///
    /// # Errors
    ///
    /// - [`ProvisioningError::DependencyMissing`] if a store must be
    ///   created and the profile's city is not in the directory or not open
    ///   for store creation. Nothing is left behind: the city is resolved
    ///   before any identity or store write.
    /// - [`ProvisioningError::Conflict`] if the profile's email already
    ///   belongs to another subject.
    #[instrument(skip(self, profile), fields(merchant_id = %profile.id, is_create))]
    pub async fn on_merchant_written(
        &self,
        profile: &MerchantProfile,
        is_create: bool,
    ) -> Result<Provisioned, ProvisioningError> {
        let _guard = self.db.lock_subject(profile.id).await;
        self.react(profile, is_create).await
    }

    /// The reaction body, for callers that already hold the per-subject
    /// lock. The keyed mutex is not reentrant; acquiring it twice on the
    /// same id deadlocks.
    pub(crate) async fn react(
        &self,
        profile: &MerchantProfile,
        is_create: bool,
    ) -> Result<Provisioned, ProvisioningError> {
        let existing_store = self.db.stores().get(profile.id).await;

        // Resolve the city before touching identity or store, so a missing
        // dependency aborts with nothing created. Store creation also needs
        // the city to be open; pilot cities sit in the directory inactive.
        // When the store already exists the update map does not include the
        // city, so an unresolved city name is not fatal to a plain field
        // projection.
        let city = self.db.cities().find_by_name(&profile.city).await;
        if existing_store.is_none() {
            match &city {
                None => {
                    error!(
                        merchant_id = %profile.id,
                        city = %profile.city,
                        "cannot provision store: city not in directory"
                    );
                    return Err(ProvisioningError::DependencyMissing(format!(
                        "city '{}' not found for merchant {}",
                        profile.city, profile.id
                    )));
                }
                Some(city) if !city.active => {
                    error!(
                        merchant_id = %profile.id,
                        city = %profile.city,
                        "cannot provision store: city not open for store creation"
                    );
                    return Err(ProvisioningError::DependencyMissing(format!(
                        "city '{}' is not open for store creation",
                        profile.city
                    )));
                }
                Some(_) => {}
            }
        }

        let identity = self.ensure_identity(profile).await?;
        let store = match existing_store {
            Some(store) => self.project_store(profile, store).await?,
            None => {
                let Some(city) = city else {
                    return Err(ProvisioningError::DependencyMissing(format!(
                        "city '{}' not found for merchant {}",
                        profile.city, profile.id
                    )));
                };
                let store = Store {
                    id: profile.id,
                    name: profile.store_name.clone(),
                    active: profile.status.is_active(),
                    manager_id: profile.id,
                    city_id: city.id,
                    address: profile.address.clone(),
                    image: profile.primary_photo().map(String::from),
                };
                let store = self.db.stores().insert(store).await?;
                info!(merchant_id = %profile.id, store = %store.name, "store provisioned");
                store
            }
        };

        if is_create {
            info!(merchant_id = %profile.id, "merchant provisioned");
        }

        Ok(Provisioned { identity, store })
    }

    /// Create the identity if absent; otherwise keep only email and owner
    /// name in step. Role and credential are never touched on update.
    async fn ensure_identity(
        &self,
        profile: &MerchantProfile,
    ) -> Result<Identity, ProvisioningError> {
        match self.db.identities().get(profile.id).await {
            Some(mut identity) => {
                if identity.email != profile.email || identity.name != profile.owner_name {
                    identity.email = profile.email.clone();
                    identity.name = profile.owner_name.clone();
                    identity = self.db.identities().update(identity).await?;
                }
                Ok(identity)
            }
            None => {
                let identity = Identity::provisioned_merchant(
                    profile.id,
                    profile.email.clone(),
                    profile.owner_name.clone(),
                );
                let identity = self.db.identities().insert(identity).await?;
                info!(merchant_id = %profile.id, "identity provisioned");
                Ok(identity)
            }
        }
    }

    /// Project the fixed update field map onto an existing store:
    /// `store_name -> name`, `status -> active`, `address -> address`,
    /// `photos[0] -> image`. Everything else on the store is operational
    /// state it owns itself.
    async fn project_store(
        &self,
        profile: &MerchantProfile,
        mut store: Store,
    ) -> Result<Store, ProvisioningError> {
        let projected = Store {
            name: profile.store_name.clone(),
            active: profile.status.is_active(),
            address: profile.address.clone(),
            image: profile.primary_photo().map(String::from),
            ..store.clone()
        };
        if projected == store {
            return Ok(store);
        }
        store = self.db.stores().update(projected).await?;
        Ok(store)
    }

    /// Whether the derived rows for this merchant currently match what the
    /// reactor would produce. Used by the reconciliation sweep.
    pub async fn is_consistent(&self, profile: &MerchantProfile) -> bool {
        let Some(identity) = self.db.identities().get(profile.id).await else {
            return false;
        };
        if identity.email != profile.email || identity.name != profile.owner_name {
            return false;
        }
        let Some(store) = self.db.stores().get(profile.id).await else {
            return false;
        };
        store.name == profile.store_name
            && store.active == profile.status.is_active()
            && store.address == profile.address
            && store.image.as_deref() == profile.primary_photo()
            && store.manager_id == profile.id
    }

    /// Store ids that have no owning merchant profile. The sweep reports
    /// these; it never guesses a repair for them.
    pub async fn orphan_stores(&self) -> Vec<SubjectId> {
        let mut orphans = Vec::new();
        for store in self.db.stores().list().await {
            if self.db.merchants().get(store.id).await.is_none() {
                orphans.push(store.id);
            }
        }
        orphans
    }
}
