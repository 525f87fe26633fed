//! Engine services: provisioning, sync, inventory, orders, notifications,
//! payments, and the reconciliation sweep.

pub mod catalog_sync;
pub mod inventory;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod provisioning;
pub mod reconciliation;

pub use catalog_sync::{CatalogSyncService, SyncError};
pub use inventory::{InventoryLedger, LedgerError};
pub use notifications::{EventPayload, NotificationHub, StoreEvent};
pub use orders::{OrderError, OrderLifecycleManager, RefundRetryPolicy};
pub use payments::{GatewayError, NoopGateway, PaymentGateway, RefundConfirmation};
pub use provisioning::{Provisioned, ProvisioningError, ProvisioningReactor};
pub use reconciliation::{DriftReport, ReconciliationJob};
