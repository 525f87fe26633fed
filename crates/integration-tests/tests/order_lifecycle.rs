//! Order state machine and the gateway-confirmed refund flow.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use pickupmart_core::{CredentialRef, Email, OrderId, OrderStatus, Price, Role, SubjectId};
use pickupmart_engine::models::{Identity, NewOrder, Order};
use pickupmart_engine::services::orders::RefundRetryPolicy;
use pickupmart_engine::services::{
    EventPayload, GatewayError, OrderError, PaymentGateway, RefundConfirmation,
};
use pickupmart_engine::{Engine, EngineConfig};
use pickupmart_integration_tests::{engine, inr, merchant_input};

/// Gateway that fails with a retryable error a fixed number of times
/// before confirming, counting every attempt.
#[derive(Debug, Clone)]
struct FlakyGateway {
    failures: u32,
    attempts: Arc<AtomicU32>,
}

impl PaymentGateway for FlakyGateway {
    async fn refund(
        &self,
        _order_id: OrderId,
        amount: Price,
    ) -> Result<RefundConfirmation, GatewayError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures {
            return Err(GatewayError::Unavailable("connection reset".into()));
        }
        Ok(RefundConfirmation {
            reference: format!("flaky-{attempt}"),
            amount,
        })
    }
}

/// Gateway that declines every refund.
#[derive(Debug, Clone, Copy)]
struct DecliningGateway;

impl PaymentGateway for DecliningGateway {
    async fn refund(
        &self,
        _order_id: OrderId,
        _amount: Price,
    ) -> Result<RefundConfirmation, GatewayError> {
        Err(GatewayError::Declined("already reversed".into()))
    }
}

/// Seed a store and a consumer, then place a paid order. Emails are
/// uniqued so a test can seed more than one order.
async fn paid_order<G: PaymentGateway + Clone>(engine: &Engine<G>) -> Order {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let profile = engine
        .create_merchant(merchant_input(
            "Order Mart",
            &format!("ordermart-{suffix}@example.com"),
        ))
        .await
        .unwrap();

    let consumer = SubjectId::generate();
    engine
        .db()
        .identities()
        .insert(Identity {
            id: consumer,
            email: Email::parse(&format!("shopper-{suffix}@example.com")).unwrap(),
            name: "Shopper".to_string(),
            role: Role::Consumer,
            credential: CredentialRef::placeholder(),
        })
        .await
        .unwrap();

    engine
        .orders()
        .create_order(NewOrder {
            user_id: consumer,
            store_id: profile.id,
            total_amount: inr(50000),
            is_paid: true,
            metadata: serde_json::Value::Null,
        })
        .await
        .unwrap()
}

/// Walk an order through the forward pickup flow to COMPLETED.
async fn complete<G: PaymentGateway + Clone>(engine: &Engine<G>, id: OrderId) -> Order {
    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::ReadyForPickup,
        OrderStatus::Completed,
    ] {
        engine.orders().transition(id, status).await.unwrap();
    }
    engine.orders().get(id).await.unwrap()
}

fn zero_backoff_config() -> EngineConfig {
    EngineConfig {
        refund_retry: RefundRetryPolicy {
            max_attempts: 3,
            base_backoff: Duration::ZERO,
        },
        ..EngineConfig::default()
    }
}

#[tokio::test]
async fn test_full_pickup_flow() {
    let engine = engine().await;
    let order = paid_order(&engine).await;
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.otp.len(), 6);

    let order = complete(&engine, order.id).await;
    assert_eq!(order.status, OrderStatus::Completed);
}

#[tokio::test]
async fn test_refund_on_completed_order_is_rejected_and_state_unchanged() {
    let engine = engine().await;
    let order = paid_order(&engine).await;
    complete(&engine, order.id).await;

    let err = engine.orders().refund(order.id, inr(50000)).await.unwrap_err();
    assert!(matches!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Refunded,
        }
    ));

    let after = engine.orders().get(order.id).await.unwrap();
    assert_eq!(after.status, OrderStatus::Completed);
    assert!(after.is_paid);
}

#[tokio::test]
async fn test_refund_happy_path() {
    let engine = engine().await;
    let order = paid_order(&engine).await;
    complete(&engine, order.id).await;
    engine
        .orders()
        .transition(order.id, OrderStatus::ReturnRequested)
        .await
        .unwrap();
    engine
        .orders()
        .transition(order.id, OrderStatus::ReturnApproved)
        .await
        .unwrap();

    let (refunded, confirmation) = engine.orders().refund(order.id, inr(50000)).await.unwrap();
    assert_eq!(refunded.status, OrderStatus::Refunded);
    assert!(confirmation.reference.starts_with("noop-"));
}

#[tokio::test]
async fn test_refund_requires_payment_and_caps_at_total() {
    let engine = engine().await;
    let order = paid_order(&engine).await;
    complete(&engine, order.id).await;
    engine
        .orders()
        .transition(order.id, OrderStatus::ReturnRequested)
        .await
        .unwrap();
    engine
        .orders()
        .transition(order.id, OrderStatus::ReturnApproved)
        .await
        .unwrap();

    let err = engine.orders().refund(order.id, inr(50001)).await.unwrap_err();
    assert!(matches!(err, OrderError::RefundExceedsTotal { .. }));
    assert_eq!(
        engine.orders().get(order.id).await.unwrap().status,
        OrderStatus::ReturnApproved
    );
}

#[tokio::test]
async fn test_refunded_is_unreachable_through_plain_transition() {
    let engine = engine().await;
    let order = paid_order(&engine).await;

    let err = engine
        .orders()
        .transition(order.id, OrderStatus::Refunded)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::RefundOutsideFlow));
}

#[tokio::test]
async fn test_flaky_gateway_is_retried_until_it_confirms() {
    let attempts = Arc::new(AtomicU32::new(0));
    let gateway = FlakyGateway {
        failures: 2,
        attempts: Arc::clone(&attempts),
    };
    let engine = Engine::with_gateway(&zero_backoff_config(), gateway);
    engine.migrate().await;

    let order = paid_order(&engine).await;
    complete(&engine, order.id).await;
    engine
        .orders()
        .transition(order.id, OrderStatus::ReturnRequested)
        .await
        .unwrap();
    engine
        .orders()
        .transition(order.id, OrderStatus::ReturnApproved)
        .await
        .unwrap();

    let (refunded, _) = engine.orders().refund(order.id, inr(50000)).await.unwrap();
    assert_eq!(refunded.status, OrderStatus::Refunded);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_declined_refund_is_not_retried_and_commits_nothing() {
    let engine = Engine::with_gateway(&zero_backoff_config(), DecliningGateway);
    engine.migrate().await;

    let order = paid_order(&engine).await;
    complete(&engine, order.id).await;
    engine
        .orders()
        .transition(order.id, OrderStatus::ReturnRequested)
        .await
        .unwrap();
    engine
        .orders()
        .transition(order.id, OrderStatus::ReturnApproved)
        .await
        .unwrap();

    let err = engine.orders().refund(order.id, inr(50000)).await.unwrap_err();
    assert!(matches!(err, OrderError::Gateway(GatewayError::Declined(_))));
    assert_eq!(
        engine.orders().get(order.id).await.unwrap().status,
        OrderStatus::ReturnApproved,
        "local state never flips without gateway confirmation"
    );
}

#[tokio::test]
async fn test_cancel_records_reason_and_closes_the_window_after_preparing() {
    let engine = engine().await;
    let order = paid_order(&engine).await;

    engine
        .orders()
        .transition(order.id, OrderStatus::Confirmed)
        .await
        .unwrap();
    engine
        .orders()
        .transition(order.id, OrderStatus::Preparing)
        .await
        .unwrap();

    let err = engine
        .orders()
        .cancel(order.id, "changed my mind".into())
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition { .. }));

    let order = paid_order(&engine).await;
    let cancelled = engine
        .orders()
        .cancel(order.id, "out of stock".into())
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.cancelled_reason.as_deref(), Some("out of stock"));
}

#[tokio::test]
async fn test_transitions_broadcast_on_the_store_topic_after_commit() {
    let engine = engine().await;
    let order = paid_order(&engine).await;
    let mut rx = engine.hub().subscribe(order.store_id);

    engine
        .orders()
        .transition(order.id, OrderStatus::Confirmed)
        .await
        .unwrap();

    let event = rx.recv().await.unwrap();
    assert_eq!(event.store_id, order.store_id);
    assert_eq!(
        event.payload,
        EventPayload::StatusChanged {
            order_id: order.id,
            status: OrderStatus::Confirmed,
        }
    );
    // The committed row already reflects what was broadcast.
    assert_eq!(
        engine.orders().get(order.id).await.unwrap().status,
        OrderStatus::Confirmed
    );
}

#[tokio::test]
async fn test_order_for_unknown_store_is_rejected() {
    let engine = engine().await;
    let consumer = SubjectId::generate();
    engine
        .db()
        .identities()
        .insert(Identity {
            id: consumer,
            email: Email::parse("lost@example.com").unwrap(),
            name: "Lost".to_string(),
            role: Role::Consumer,
            credential: CredentialRef::placeholder(),
        })
        .await
        .unwrap();

    let err = engine
        .orders()
        .create_order(NewOrder {
            user_id: consumer,
            store_id: SubjectId::generate(),
            total_amount: inr(100),
            is_paid: false,
            metadata: serde_json::Value::Null,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::DependencyMissing(_)));
}
