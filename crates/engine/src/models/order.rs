//! Pickup order record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pickupmart_core::{OrderId, OrderStatus, Price, SubjectId};

/// A buy-online-pick-up-in-store order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-facing order number shown on pickup receipts.
    pub order_number: String,
    pub user_id: SubjectId,
    pub store_id: SubjectId,
    pub status: OrderStatus,
    pub total_amount: Price,
    pub is_paid: bool,
    /// One-time code the shopper presents at pickup.
    pub otp: String,
    pub cancelled_reason: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for placing an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: SubjectId,
    pub store_id: SubjectId,
    pub total_amount: Price,
    #[serde(default)]
    pub is_paid: bool,
    /// Defaults to `Value::Null` when absent from the payload.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_deserializes_without_optional_fields() {
        let raw = format!(
            r#"{{"user_id":"{}","store_id":"{}","total_amount":{{"amount":"199.50","currency_code":"INR"}}}}"#,
            SubjectId::generate(),
            SubjectId::generate(),
        );
        let order: NewOrder = serde_json::from_str(&raw).expect("minimal payload parses");
        assert!(!order.is_paid);
        assert!(order.metadata.is_null());
    }
}
