//! In-memory transactional store for the consistency engine.
//!
//! All tables hang off a single [`Database`] handle behind one
//! `tokio::sync::RwLock`, so cross-table invariants (shared primary key,
//! email uniqueness across identities and profiles, manager resolvability)
//! are checked under the same guard that performs the write.
//!
//! On top of the table lock, the handle hands out per-identifier async
//! mutexes: operations on the same merchant/product/order id serialize for
//! their whole duration while distinct ids proceed in parallel.
//!
//! # Modules
//!
//! - [`merchants`] / [`identities`] / [`cities`] / [`stores`] - the three
//!   merchant representations plus the city directory
//! - [`products`] - catalog, store links
//! - [`audit`] - append-only audit log
//! - [`orders`] - pickup orders
//! - [`migrations`] - versioned, tracked reference-data migrations

pub mod audit;
pub mod cities;
pub mod identities;
pub mod merchants;
pub mod migrations;
pub mod orders;
pub mod products;
pub mod stores;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex as StdMutex};

use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use pickupmart_core::{CityId, OrderId, ProductId, StoreProductLinkId, SubjectId};

use crate::models::{
    AuditLogEntry, City, Identity, MerchantProfile, Order, Product, Store, StoreProductLink,
};

pub use audit::AuditLogRepository;
pub use cities::CityRepository;
pub use identities::IdentityRepository;
pub use merchants::MerchantRepository;
pub use migrations::{MigrationReport, migrate};
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use stores::StoreRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Uniqueness or referential constraint violation.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// All entity tables, guarded together.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub(crate) merchants: HashMap<SubjectId, MerchantProfile>,
    pub(crate) identities: HashMap<SubjectId, Identity>,
    pub(crate) cities: HashMap<CityId, City>,
    pub(crate) stores: HashMap<SubjectId, Store>,
    pub(crate) products: HashMap<ProductId, Product>,
    pub(crate) links: HashMap<StoreProductLinkId, StoreProductLink>,
    pub(crate) orders: HashMap<OrderId, Order>,
    pub(crate) audit_log: Vec<AuditLogEntry>,
    /// Applied migration versions and names, in order.
    pub(crate) applied_migrations: BTreeMap<u32, String>,
}

#[derive(Debug)]
struct Inner {
    tables: RwLock<Tables>,
    /// Per-identifier write locks. The map itself is only touched briefly
    /// to clone out the Arc; the inner mutex is what callers hold.
    locks: StdMutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

/// Cheaply clonable handle to the engine's store.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    /// Create an empty database. Run [`migrate`] before first use so the
    /// city directory and other reference data exist.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                tables: RwLock::new(Tables::default()),
                locks: StdMutex::new(HashMap::new()),
            }),
        }
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.inner.tables.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.inner.tables.write().await
    }

    /// Acquire the write lock for a single identifier, creating it on first
    /// use. Held guards serialize every operation on that id.
    pub async fn lock_key(&self, key: Uuid) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut locks = self
                .inner
                .locks
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            Arc::clone(locks.entry(key).or_default())
        };
        mutex.lock_owned().await
    }

    /// Per-merchant lock used by provisioning, sync, and cascade deletes.
    pub async fn lock_subject(&self, id: SubjectId) -> OwnedMutexGuard<()> {
        self.lock_key(id.as_uuid()).await
    }

    /// Per-product lock used by catalog mutations.
    pub async fn lock_product(&self, id: ProductId) -> OwnedMutexGuard<()> {
        self.lock_key(id.as_uuid()).await
    }

    /// Per-order lock used by status transitions.
    pub async fn lock_order(&self, id: OrderId) -> OwnedMutexGuard<()> {
        self.lock_key(id.as_uuid()).await
    }

    /// Drop the lock entry for an identifier, so deleted ids do not pin
    /// map entries forever. A no-op while any guard is held or awaited on
    /// the key; callers evict after releasing their own guard.
    pub fn evict_key(&self, key: Uuid) {
        let mut locks = self
            .inner
            .locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let unheld = locks
            .get(&key)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1);
        if unheld {
            locks.remove(&key);
        }
    }

    /// Evict the per-merchant lock after a cascade delete.
    pub fn evict_subject(&self, id: SubjectId) {
        self.evict_key(id.as_uuid());
    }

    /// Evict the per-product lock after a product delete.
    pub fn evict_product(&self, id: ProductId) {
        self.evict_key(id.as_uuid());
    }

    #[cfg(test)]
    fn keyed_lock_count(&self) -> usize {
        self.inner
            .locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Repository for merchant profiles.
    #[must_use]
    pub const fn merchants(&self) -> MerchantRepository<'_> {
        MerchantRepository::new(self)
    }

    /// Repository for login identities.
    #[must_use]
    pub const fn identities(&self) -> IdentityRepository<'_> {
        IdentityRepository::new(self)
    }

    /// Repository for the city directory.
    #[must_use]
    pub const fn cities(&self) -> CityRepository<'_> {
        CityRepository::new(self)
    }

    /// Repository for operational stores.
    #[must_use]
    pub const fn stores(&self) -> StoreRepository<'_> {
        StoreRepository::new(self)
    }

    /// Repository for products and store links.
    #[must_use]
    pub const fn products(&self) -> ProductRepository<'_> {
        ProductRepository::new(self)
    }

    /// Repository for orders.
    #[must_use]
    pub const fn orders(&self) -> OrderRepository<'_> {
        OrderRepository::new(self)
    }

    /// Repository for the append-only audit log.
    #[must_use]
    pub const fn audit(&self) -> AuditLogRepository<'_> {
        AuditLogRepository::new(self)
    }
}

/// Check that an email is not used by a different subject, across both the
/// identity and merchant profile tables.
pub(crate) fn check_email_unique(
    tables: &Tables,
    email: &pickupmart_core::Email,
    owner: SubjectId,
) -> Result<(), StorageError> {
    if tables
        .identities
        .values()
        .any(|identity| identity.email == *email && identity.id != owner)
    {
        return Err(StorageError::Conflict(format!(
            "email {email} already belongs to another identity"
        )));
    }
    if tables
        .merchants
        .values()
        .any(|profile| profile.email == *email && profile.id != owner)
    {
        return Err(StorageError::Conflict(format!(
            "email {email} already belongs to another merchant profile"
        )));
    }
    Ok(())
}
