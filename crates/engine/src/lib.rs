//! Merchant provisioning and consistency engine for a pick-up-in-store
//! marketplace.
//!
//! The engine keeps three representations of a merchant in step: the
//! admin-facing [`models::MerchantProfile`], the login
//! [`models::Identity`], and the operational [`models::Store`], all
//! sharing one primary key. Writes to the profile propagate through the
//! [`services::ProvisioningReactor`]; drift is swept up by the
//! [`services::ReconciliationJob`] running the same code path. On top of
//! that sit the store-scoped product ledger with field-level audit
//! history and the order status state machine with its gateway-confirmed
//! refund flow.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod models;
pub mod services;

use tracing::instrument;

use pickupmart_core::SubjectId;

pub use config::{ConfigError, EngineConfig};
pub use db::{Database, StorageError};

use db::migrations::{migrate, MigrationReport};
use models::{MerchantProfile, NewMerchantProfile};
use services::{
    CatalogSyncService, InventoryLedger, NoopGateway, NotificationHub, OrderLifecycleManager,
    PaymentGateway, ProvisioningError, ProvisioningReactor, ReconciliationJob,
};

/// The assembled engine: storage, notification hub, and every service
/// wired over them.
///
/// Merchant writes go through [`Engine::create_merchant`] and
/// [`Engine::update_merchant`] so the profile write and the provisioning
/// reaction happen under one per-merchant lock.
#[derive(Debug, Clone)]
pub struct Engine<G = NoopGateway> {
    db: Database,
    hub: NotificationHub,
    reactor: ProvisioningReactor,
    catalog_sync: CatalogSyncService,
    inventory: InventoryLedger,
    orders: OrderLifecycleManager<G>,
    reconciliation: ReconciliationJob,
}

impl Engine<NoopGateway> {
    /// Assemble an engine with the no-op payment gateway.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_gateway(config, NoopGateway)
    }
}

impl<G: PaymentGateway + Clone> Engine<G> {
    /// Assemble an engine over a fresh database and the given gateway.
    #[must_use]
    pub fn with_gateway(config: &EngineConfig, gateway: G) -> Self {
        let db = Database::new();
        let hub = NotificationHub::new(config.notification_capacity);
        Self {
            reactor: ProvisioningReactor::new(db.clone()),
            catalog_sync: CatalogSyncService::new(db.clone()),
            inventory: InventoryLedger::new(db.clone(), hub.clone()),
            orders: OrderLifecycleManager::new(
                db.clone(),
                hub.clone(),
                gateway,
                config.refund_retry,
            ),
            reconciliation: ReconciliationJob::new(db.clone()),
            db,
            hub,
        }
    }

    /// Apply pending schema/seed migrations. Idempotent.
    pub async fn migrate(&self) -> MigrationReport {
        migrate(&self.db).await
    }

    /// Create a merchant profile and provision its identity and store.
    ///
    /// All-or-nothing: the city is resolved before the profile row is
    /// written, so a missing city leaves no profile, identity, or store
    /// behind.
    ///
    /// # Errors
    ///
    /// - [`ProvisioningError::DependencyMissing`] if the city is not in
    ///   the directory or not yet open for store creation.
    /// - [`ProvisioningError::Conflict`] if the email already belongs to
    ///   another subject.
    #[instrument(skip(self, input), fields(store_name = %input.store_name))]
    pub async fn create_merchant(
        &self,
        input: NewMerchantProfile,
    ) -> Result<MerchantProfile, ProvisioningError> {
        let profile = input.into_profile(chrono::Utc::now());
        let _guard = self.db.lock_subject(profile.id).await;

        match self.db.cities().find_by_name(&profile.city).await {
            None => {
                return Err(ProvisioningError::DependencyMissing(format!(
                    "city '{}' not found",
                    profile.city
                )));
            }
            Some(city) if !city.active => {
                return Err(ProvisioningError::DependencyMissing(format!(
                    "city '{}' is not open for store creation",
                    profile.city
                )));
            }
            Some(_) => {}
        }

        let profile = self.db.merchants().insert(profile).await?;
        self.reactor.react(&profile, true).await?;
        Ok(profile)
    }

    /// Update a merchant profile and propagate the change to its identity
    /// and store.
    ///
    /// # Errors
    ///
    /// - [`ProvisioningError::Storage`] if the profile does not exist.
    /// - [`ProvisioningError::Conflict`] on an email collision.
    /// - [`ProvisioningError::DependencyMissing`] if the store is missing
    ///   and the profile's city cannot be resolved to recreate it.
    #[instrument(skip(self, profile), fields(merchant_id = %profile.id))]
    pub async fn update_merchant(
        &self,
        profile: MerchantProfile,
    ) -> Result<MerchantProfile, ProvisioningError> {
        let _guard = self.db.lock_subject(profile.id).await;
        let profile = self.db.merchants().update(profile).await?;
        self.reactor.react(&profile, false).await?;
        Ok(profile)
    }

    /// Delete a merchant and everything hanging off it: store links, the
    /// store, the identity, and finally the profile.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the profile does not exist.
    #[instrument(skip(self))]
    pub async fn delete_merchant(&self, id: SubjectId) -> Result<(), StorageError> {
        {
            let _guard = self.db.lock_subject(id).await;
            self.db.merchants().delete_cascade(id).await?;
        }
        self.db.evict_subject(id);
        Ok(())
    }

    /// Read a merchant profile.
    pub async fn merchant(&self, id: SubjectId) -> Option<MerchantProfile> {
        self.db.merchants().get(id).await
    }

    /// All merchant profiles, sorted by store name.
    pub async fn merchants(&self) -> Vec<MerchantProfile> {
        self.db.merchants().list().await
    }

    /// The store-to-profile backfill service.
    #[must_use]
    pub const fn catalog_sync(&self) -> &CatalogSyncService {
        &self.catalog_sync
    }

    /// The product ledger.
    #[must_use]
    pub const fn inventory(&self) -> &InventoryLedger {
        &self.inventory
    }

    /// The order lifecycle manager.
    #[must_use]
    pub const fn orders(&self) -> &OrderLifecycleManager<G> {
        &self.orders
    }

    /// The drift sweep job.
    #[must_use]
    pub const fn reconciliation(&self) -> &ReconciliationJob {
        &self.reconciliation
    }

    /// The notification hub, for subscribing to store topics.
    #[must_use]
    pub const fn hub(&self) -> &NotificationHub {
        &self.hub
    }

    /// Direct storage access, for seeding and assertions in tests and for
    /// the CLI's read paths.
    #[must_use]
    pub const fn db(&self) -> &Database {
        &self.db
    }
}
