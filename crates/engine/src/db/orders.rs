//! Repository for pickup orders.

use chrono::Utc;

use pickupmart_core::{OrderId, SubjectId};

use super::{Database, StorageError};
use crate::models::Order;

/// Repository for order operations.
pub struct OrderRepository<'a> {
    db: &'a Database,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a new order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id already exists.
    pub async fn insert(&self, order: Order) -> Result<Order, StorageError> {
        let mut tables = self.db.write().await;
        if tables.orders.contains_key(&order.id) {
            return Err(StorageError::Conflict(format!(
                "order {} already exists",
                order.id
            )));
        }
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    /// Replace an existing order, bumping `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the order doesn't exist.
    pub async fn update(&self, mut order: Order) -> Result<Order, StorageError> {
        let mut tables = self.db.write().await;
        if !tables.orders.contains_key(&order.id) {
            return Err(StorageError::NotFound);
        }
        order.updated_at = Utc::now();
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    /// Get an order by id.
    pub async fn get(&self, id: OrderId) -> Option<Order> {
        self.db.read().await.orders.get(&id).cloned()
    }

    /// List orders for a store, most recent first.
    pub async fn list_for_store(&self, store_id: SubjectId) -> Vec<Order> {
        let mut orders: Vec<_> = self
            .db
            .read()
            .await
            .orders
            .values()
            .filter(|order| order.store_id == store_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }
}
