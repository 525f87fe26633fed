//! Status enums for merchants, orders, and the catalog audit trail.

use serde::{Deserialize, Serialize};

/// KYC verification status gating merchant activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Operational status of a merchant profile.
///
/// Projected onto `Store.active` by the provisioning reactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MerchantStatus {
    #[default]
    Active,
    Inactive,
}

impl MerchantStatus {
    /// Whether this status maps to an active store.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for MerchantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for MerchantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("invalid merchant status: {s}")),
        }
    }
}

/// Login role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access to the admin dashboard.
    SuperAdmin,
    /// A provisioned store operator.
    Merchant,
    /// A shopper placing pickup orders.
    Consumer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "SUPER_ADMIN"),
            Self::Merchant => write!(f, "MERCHANT"),
            Self::Consumer => write!(f, "CONSUMER"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUPER_ADMIN" => Ok(Self::SuperAdmin),
            "MERCHANT" => Ok(Self::Merchant),
            "CONSUMER" => Ok(Self::Consumer),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Action recorded by a catalog audit log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    AddImage,
    RemoveImage,
}

/// Order status state machine.
///
/// Forward flow is `Pending -> Confirmed -> Preparing -> ReadyForPickup ->
/// Completed`. Cancellation is allowed before the store starts preparing.
/// The return flow hangs off `Completed`:
/// `ReturnRequested -> ReturnApproved -> Refunded`.
///
/// `Refunded` is reachable only from `ReturnApproved`; the paid/amount
/// guards live in the order lifecycle service, which also owns the external
/// payment reversal call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    ReadyForPickup,
    Completed,
    Cancelled,
    ReturnRequested,
    ReturnApproved,
    Refunded,
}

impl OrderStatus {
    /// Whether the state machine permits moving from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Preparing | Self::Cancelled)
                | (Self::Preparing, Self::ReadyForPickup)
                | (Self::ReadyForPickup, Self::Completed)
                | (Self::Completed, Self::ReturnRequested)
                | (Self::ReturnRequested, Self::ReturnApproved)
                | (Self::ReturnApproved, Self::Refunded)
        )
    }

    /// Whether no further transition is allowed out of this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Refunded)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Preparing => "PREPARING",
            Self::ReadyForPickup => "READY_FOR_PICKUP",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::ReturnRequested => "RETURN_REQUESTED",
            Self::ReturnApproved => "RETURN_APPROVED",
            Self::Refunded => "REFUNDED",
        };
        write!(f, "{s}")
    }
}
