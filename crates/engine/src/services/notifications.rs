//! Store-scoped change notification channel.
//!
//! Every committed order status transition and inventory change is
//! broadcast on a per-store topic after the owning write has committed,
//! never before. Delivery is at-least-once and fire-and-forget: a slow,
//! lagging, or absent subscriber never gates or rolls back the operation
//! that published. Consumers dedupe on [`EventPayload::dedupe_key`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use pickupmart_core::{OrderId, OrderStatus, ProductId, SubjectId};

/// What changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// An order moved to a new status.
    StatusChanged {
        order_id: OrderId,
        status: OrderStatus,
    },
    /// A store's catalog assignment changed.
    InventoryChanged { product_id: ProductId },
}

impl EventPayload {
    /// Key consumers use to drop at-least-once duplicates: for status
    /// changes it is `(order id, new status)`.
    #[must_use]
    pub fn dedupe_key(&self) -> String {
        match self {
            Self::StatusChanged { order_id, status } => format!("{order_id}:{status}"),
            Self::InventoryChanged { product_id } => format!("inventory:{product_id}"),
        }
    }
}

/// An event on a store's topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEvent {
    pub store_id: SubjectId,
    pub payload: EventPayload,
}

/// Fan-out hub holding one broadcast topic per store.
#[derive(Debug, Clone)]
pub struct NotificationHub {
    topics: Arc<Mutex<HashMap<SubjectId, broadcast::Sender<StoreEvent>>>>,
    capacity: usize,
}

impl NotificationHub {
    /// Create a hub whose topics buffer `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to a store's topic, creating it on first use.
    pub fn subscribe(&self, store_id: SubjectId) -> broadcast::Receiver<StoreEvent> {
        let mut topics = self
            .topics
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        topics
            .entry(store_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publish an event on its store's topic. Fire-and-forget: an error
    /// here only means nobody is listening, which is fine.
    pub fn publish(&self, event: StoreEvent) {
        let sender = {
            let topics = self
                .topics
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            topics.get(&event.store_id).cloned()
        };

        match sender {
            Some(sender) => {
                if sender.send(event).is_err() {
                    debug!("no live subscribers on store topic, event dropped");
                }
            }
            None => debug!(store_id = %event.store_id, "no topic for store, event dropped"),
        }
    }
}
