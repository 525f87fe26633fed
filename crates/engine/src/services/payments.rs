//! Payment gateway seam.
//!
//! The engine never speaks the gateway's wire format; it calls this trait
//! and treats the gateway as an external collaborator. The refund flow in
//! [`crate::services::orders`] is the only place the engine suspends on
//! external I/O.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use pickupmart_core::{OrderId, Price};

/// Errors surfaced by a payment gateway.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Transport or availability failure; safe to retry with backoff.
    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),

    /// The gateway processed the request and said no; never retried.
    #[error("refund declined: {0}")]
    Declined(String),
}

impl GatewayError {
    /// Whether the caller may retry this failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Proof from the gateway that a reversal went through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundConfirmation {
    /// Gateway-side reference for the reversal.
    pub reference: String,
    pub amount: Price,
}

/// External payment reversal collaborator.
pub trait PaymentGateway: Send + Sync {
    /// Reverse `amount` of the payment behind `order_id`.
    ///
    /// Local order state must not flip to refunded until this resolves
    /// successfully.
    fn refund(
        &self,
        order_id: OrderId,
        amount: Price,
    ) -> impl Future<Output = Result<RefundConfirmation, GatewayError>> + Send;
}

/// Gateway that confirms every refund immediately.
///
/// Used by the CLI demo and by tests that exercise the state machine
/// rather than gateway failure handling.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopGateway;

impl PaymentGateway for NoopGateway {
    async fn refund(
        &self,
        _order_id: OrderId,
        amount: Price,
    ) -> Result<RefundConfirmation, GatewayError> {
        Ok(RefundConfirmation {
            reference: format!("noop-{}", Uuid::new_v4()),
            amount,
        })
    }
}
