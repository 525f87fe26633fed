//! Append-only audit log repository.
//!
//! Entries are only ever appended; there is deliberately no update or
//! delete method on this repository, and reads hand out clones.

use chrono::Utc;

use pickupmart_core::{AuditAction, AuditEntryId, ProductId};

use super::Database;
use crate::models::AuditLogEntry;

/// Repository for the catalog audit log.
pub struct AuditLogRepository<'a> {
    db: &'a Database,
}

impl<'a> AuditLogRepository<'a> {
    /// Create a new audit log repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Append one entry and return it.
    pub async fn append(
        &self,
        product_id: ProductId,
        action: AuditAction,
        field: Option<String>,
        old_value: Option<String>,
        new_value: Option<String>,
        changed_by: &str,
    ) -> AuditLogEntry {
        let entry = AuditLogEntry {
            id: AuditEntryId::generate(),
            product_id,
            action,
            field,
            old_value,
            new_value,
            changed_by: changed_by.to_string(),
            at: Utc::now(),
        };
        self.db.write().await.audit_log.push(entry.clone());
        entry
    }

    /// All entries for a product, in append order.
    pub async fn for_product(&self, product_id: ProductId) -> Vec<AuditLogEntry> {
        self.db
            .read()
            .await
            .audit_log
            .iter()
            .filter(|entry| entry.product_id == product_id)
            .cloned()
            .collect()
    }

    /// The whole log, in append order. Exposed read-only to admin tooling.
    pub async fn all(&self) -> Vec<AuditLogEntry> {
        self.db.read().await.audit_log.clone()
    }

    /// Number of entries in the log.
    pub async fn len(&self) -> usize {
        self.db.read().await.audit_log.len()
    }

    /// Whether the log is empty.
    pub async fn is_empty(&self) -> bool {
        self.db.read().await.audit_log.is_empty()
    }
}
