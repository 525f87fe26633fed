//! Reconciliation command.
//!
//! Loads profiles raw, the way a legacy bulk import landed them, without
//! running the provisioning reactor. Then runs one drift sweep and prints
//! the report, demonstrating that the sweep derives the missing identity
//! and store rows through the same path a live write would take.

use std::path::Path;

use pickupmart_engine::{Engine, EngineConfig};

use super::load_merchants;

/// Seed raw profiles from `file` and run one reconciliation sweep.
pub async fn run(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_env()?;
    let engine = Engine::new(&config);
    engine.migrate().await;

    let merchants = load_merchants(file)?;
    tracing::info!(count = merchants.len(), "seeding raw profiles");

    let now = chrono::Utc::now();
    for input in merchants {
        let profile = input.into_profile(now);
        engine.db().merchants().upsert(profile).await?;
    }

    let report = engine.reconciliation().run_once().await;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}
