//! Merchant import command.
//!
//! Provisions every merchant in a JSON export through the full write path,
//! so each row either lands complete (profile, identity, store) or not at
//! all. Failed rows are reported and do not stop the import.

use std::path::Path;

use pickupmart_engine::{Engine, EngineConfig};

use super::load_merchants;

/// Import merchants from `file`, provisioning each one.
pub async fn run(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_env()?;
    let engine = Engine::new(&config);
    engine.migrate().await;

    let merchants = load_merchants(file)?;
    tracing::info!(count = merchants.len(), "importing merchants");

    let mut created = 0usize;
    let mut failed = 0usize;

    #[allow(clippy::print_stdout)]
    for input in merchants {
        let id = input.id;
        let store_name = input.store_name.clone();
        match engine.create_merchant(input).await {
            Ok(profile) => {
                created += 1;
                println!("created  {}  {}", profile.id, profile.store_name);
            }
            Err(err) => {
                failed += 1;
                println!("failed   {id}  {store_name}: {err}");
            }
        }
    }

    #[allow(clippy::print_stdout)]
    {
        println!("{created} created, {failed} failed");
    }
    Ok(())
}
