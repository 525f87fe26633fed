//! Periodic drift sweep over merchant profiles.
//!
//! Walks every profile, checks the derived identity/store pair against
//! what the reactor would produce, and repairs drift through the same
//! [`ProvisioningReactor`] code path the synchronous write hook uses.
//! One misbehaving merchant never aborts the sweep; its failure is
//! recorded in the report and the walk continues.

use serde::Serialize;
use tracing::{info, instrument, warn};

use pickupmart_core::SubjectId;

use crate::db::Database;
use crate::services::provisioning::ProvisioningReactor;

/// What a sweep found and did.
#[derive(Debug, Default, Serialize)]
pub struct DriftReport {
    /// Profiles walked.
    pub examined: usize,
    /// Merchants whose derived rows were out of step and were repaired.
    pub repaired: Vec<SubjectId>,
    /// Merchants whose repair failed, with the error rendered for the
    /// operator.
    pub failed: Vec<(SubjectId, String)>,
    /// Stores with no owning profile. Reported only; deleting or adopting
    /// them is an operator decision.
    pub orphan_stores: Vec<SubjectId>,
}

impl DriftReport {
    /// True when the sweep found nothing to do.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.repaired.is_empty() && self.failed.is_empty() && self.orphan_stores.is_empty()
    }
}

/// Drift detection and repair job.
#[derive(Debug, Clone)]
pub struct ReconciliationJob {
    db: Database,
    reactor: ProvisioningReactor,
}

impl ReconciliationJob {
    /// Create a job over the given database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        let reactor = ProvisioningReactor::new(db.clone());
        Self { db, reactor }
    }

    /// Run one full sweep and return the report.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> DriftReport {
        let mut report = DriftReport::default();

        for profile in self.db.merchants().list().await {
            report.examined += 1;
            if self.reactor.is_consistent(&profile).await {
                continue;
            }
            match self.reactor.on_merchant_written(&profile, false).await {
                Ok(_) => {
                    info!(merchant_id = %profile.id, "drift repaired");
                    report.repaired.push(profile.id);
                }
                Err(err) => {
                    warn!(merchant_id = %profile.id, error = %err, "drift repair failed");
                    report.failed.push((profile.id, err.to_string()));
                }
            }
        }

        report.orphan_stores = self.reactor.orphan_stores().await;
        info!(
            examined = report.examined,
            repaired = report.repaired.len(),
            failed = report.failed.len(),
            orphans = report.orphan_stores.len(),
            "reconciliation sweep finished"
        );
        report
    }
}
