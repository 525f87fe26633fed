//! Order lifecycle: the status state machine and the refund sub-flow.
//!
//! Transitions are validated against [`OrderStatus::can_transition_to`],
//! committed under the per-order lock, and broadcast on the store topic
//! after commit. The refund path is the engine's single external
//! suspension point: local state flips to REFUNDED only once the payment
//! gateway confirms the reversal.

use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::{info, instrument, warn};

use pickupmart_core::{OrderId, OrderStatus, Price, SubjectId};

use crate::db::{Database, StorageError};
use crate::models::{NewOrder, Order};
use crate::services::notifications::{EventPayload, NotificationHub, StoreEvent};
use crate::services::payments::{GatewayError, PaymentGateway, RefundConfirmation};

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The order id does not exist.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The user identity or store an order references does not exist.
    #[error("dependency missing: {0}")]
    DependencyMissing(String),

    /// Illegal status move. Returned to the caller, never retried.
    #[error("illegal transition {from} -> {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Refunds must go through [`OrderLifecycleManager::refund`], which
    /// owns the gateway call; a plain transition to REFUNDED is refused.
    #[error("REFUNDED is only reachable through the refund flow")]
    RefundOutsideFlow,

    /// Refund guard: the order was never paid.
    #[error("order {0} is not paid")]
    NotPaid(OrderId),

    /// Refund guard: the requested amount exceeds the order total.
    #[error("refund {requested} exceeds order total {total}")]
    RefundExceedsTotal { requested: Price, total: Price },

    /// External payment reversal failed. Retryable variants were already
    /// retried with backoff before this surfaced.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Underlying storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Retry policy for the external refund call.
#[derive(Debug, Clone, Copy)]
pub struct RefundRetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Base backoff; attempt `n` waits `base * n`.
    pub base_backoff: Duration,
}

impl Default for RefundRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
        }
    }
}

/// Order status state machine and refund flow.
#[derive(Debug, Clone)]
pub struct OrderLifecycleManager<G> {
    db: Database,
    hub: NotificationHub,
    gateway: G,
    retry: RefundRetryPolicy,
}

impl<G: PaymentGateway> OrderLifecycleManager<G> {
    /// Create a lifecycle manager over the given database, hub, and
    /// payment gateway.
    #[must_use]
    pub const fn new(
        db: Database,
        hub: NotificationHub,
        gateway: G,
        retry: RefundRetryPolicy,
    ) -> Self {
        Self {
            db,
            hub,
            gateway,
            retry,
        }
    }

    /// Place a new order in PENDING with a fresh order number and pickup
    /// OTP.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::DependencyMissing` if the user identity or the
    /// store does not exist.
    #[instrument(skip(self, input), fields(store_id = %input.store_id))]
    pub async fn create_order(&self, input: NewOrder) -> Result<Order, OrderError> {
        if self.db.identities().get(input.user_id).await.is_none() {
            return Err(OrderError::DependencyMissing(format!(
                "user identity {} not found",
                input.user_id
            )));
        }
        if self.db.stores().get(input.store_id).await.is_none() {
            return Err(OrderError::DependencyMissing(format!(
                "store {} not found",
                input.store_id
            )));
        }

        let now = chrono::Utc::now();
        let order = Order {
            id: OrderId::generate(),
            order_number: generate_order_number(now),
            user_id: input.user_id,
            store_id: input.store_id,
            status: OrderStatus::Pending,
            total_amount: input.total_amount,
            is_paid: input.is_paid,
            otp: generate_otp(),
            cancelled_reason: None,
            metadata: input.metadata,
            created_at: now,
            updated_at: now,
        };
        let order = self.db.orders().insert(order).await?;
        info!(order_id = %order.id, order_number = %order.order_number, "order placed");
        Ok(order)
    }

    /// Move an order to `next`, commit, then broadcast.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidTransition` for a move the state
    /// machine forbids and `OrderError::RefundOutsideFlow` for a direct
    /// move to REFUNDED.
    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        order_id: OrderId,
        next: OrderStatus,
    ) -> Result<Order, OrderError> {
        if next == OrderStatus::Refunded {
            return Err(OrderError::RefundOutsideFlow);
        }

        let _guard = self.db.lock_order(order_id).await;
        let order = self
            .db
            .orders()
            .get(order_id)
            .await
            .ok_or(OrderError::NotFound(order_id))?;

        let order = self.commit_status(order, next, None).await?;
        Ok(order)
    }

    /// Cancel an order, recording the reason. Only legal while the store
    /// has not started preparing.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidTransition` outside the cancellation
    /// window.
    #[instrument(skip(self, reason))]
    pub async fn cancel(&self, order_id: OrderId, reason: String) -> Result<Order, OrderError> {
        let _guard = self.db.lock_order(order_id).await;
        let order = self
            .db
            .orders()
            .get(order_id)
            .await
            .ok_or(OrderError::NotFound(order_id))?;

        let order = self
            .commit_status(order, OrderStatus::Cancelled, Some(reason))
            .await?;
        Ok(order)
    }

    /// Refund a returned order through the payment gateway.
    ///
    /// Guards: status must be RETURN_APPROVED, the order must be paid, and
    /// the amount must not exceed the total. The gateway call is retried
    /// with linear backoff on retryable failures; the local status is not
    /// mutated until the gateway confirms. On a timeout upstream the order
    /// must be re-checked, not treated as failed: the commit may already
    /// have happened.
    ///
    /// # Errors
    ///
    /// `OrderError::InvalidTransition` when not RETURN_APPROVED,
    /// `OrderError::NotPaid` / `OrderError::RefundExceedsTotal` on guard
    /// failure, `OrderError::Gateway` when the gateway ultimately fails.
    #[instrument(skip(self))]
    pub async fn refund(
        &self,
        order_id: OrderId,
        amount: Price,
    ) -> Result<(Order, RefundConfirmation), OrderError> {
        let _guard = self.db.lock_order(order_id).await;
        let order = self
            .db
            .orders()
            .get(order_id)
            .await
            .ok_or(OrderError::NotFound(order_id))?;

        if !order.status.can_transition_to(OrderStatus::Refunded) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Refunded,
            });
        }
        if !order.is_paid {
            return Err(OrderError::NotPaid(order_id));
        }
        if amount.amount > order.total_amount.amount
            || amount.currency_code != order.total_amount.currency_code
        {
            return Err(OrderError::RefundExceedsTotal {
                requested: amount,
                total: order.total_amount,
            });
        }

        // External reversal first; commit only on confirmation.
        let confirmation = self.refund_with_retry(order_id, amount).await?;

        let order = self
            .commit_status(order, OrderStatus::Refunded, None)
            .await?;
        info!(
            order_id = %order_id,
            reference = %confirmation.reference,
            "refund confirmed and committed"
        );
        Ok((order, confirmation))
    }

    /// Call the gateway, retrying retryable failures with linear backoff.
    async fn refund_with_retry(
        &self,
        order_id: OrderId,
        amount: Price,
    ) -> Result<RefundConfirmation, OrderError> {
        let mut attempt = 1;
        loop {
            match self.gateway.refund(order_id, amount).await {
                Ok(confirmation) => return Ok(confirmation),
                Err(err) if err.is_retryable() && attempt < self.retry.max_attempts => {
                    warn!(
                        order_id = %order_id,
                        attempt,
                        error = %err,
                        "refund attempt failed, retrying"
                    );
                    tokio::time::sleep(self.retry.base_backoff * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(OrderError::Gateway(err)),
            }
        }
    }

    /// Validate against the state machine, write, then broadcast. The
    /// broadcast happens strictly after the committed write and never
    /// feeds back into it.
    async fn commit_status(
        &self,
        mut order: Order,
        next: OrderStatus,
        cancelled_reason: Option<String>,
    ) -> Result<Order, OrderError> {
        if !order.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        order.status = next;
        if cancelled_reason.is_some() {
            order.cancelled_reason = cancelled_reason;
        }
        let order = self.db.orders().update(order).await?;

        self.hub.publish(StoreEvent {
            store_id: order.store_id,
            payload: EventPayload::StatusChanged {
                order_id: order.id,
                status: order.status,
            },
        });
        info!(order_id = %order.id, status = %order.status, "order status committed");
        Ok(order)
    }

    /// Read an order.
    pub async fn get(&self, order_id: OrderId) -> Option<Order> {
        self.db.orders().get(order_id).await
    }

    /// Orders for a store, most recent first.
    pub async fn orders_for_store(&self, store_id: SubjectId) -> Vec<Order> {
        self.db.orders().list_for_store(store_id).await
    }
}

/// Human-facing order number: date bucket plus a random suffix.
fn generate_order_number(now: chrono::DateTime<chrono::Utc>) -> String {
    let suffix: u32 = rand::rng().random_range(0..1_000_000);
    format!("PM-{}-{suffix:06}", now.format("%Y%m%d"))
}

/// Six-digit pickup OTP.
fn generate_otp() -> String {
    let code: u32 = rand::rng().random_range(0..1_000_000);
    format!("{code:06}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_shape() {
        let now = chrono::Utc::now();
        let number = generate_order_number(now);
        assert!(number.starts_with("PM-"));
        assert_eq!(number.len(), "PM-YYYYMMDD-NNNNNN".len());
    }

    #[test]
    fn test_otp_is_six_digits() {
        let otp = generate_otp();
        assert_eq!(otp.len(), 6);
        assert!(otp.chars().all(|c| c.is_ascii_digit()));
    }
}
