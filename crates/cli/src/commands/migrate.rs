//! Migration command.
//!
//! Assembles an engine and applies every pending migration, printing the
//! versions that ran and the ones already applied.

use pickupmart_engine::{Engine, EngineConfig};

/// Apply pending migrations against a fresh engine.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_env()?;
    let engine = Engine::new(&config);

    tracing::info!("Applying migrations...");
    let report = engine.migrate().await;

    #[allow(clippy::print_stdout)]
    {
        for (version, name) in &report.applied {
            println!("applied  v{version}  {name}");
        }
        for version in &report.skipped {
            println!("skipped  v{version} (already applied)");
        }
        println!(
            "{} applied, {} skipped",
            report.applied.len(),
            report.skipped.len()
        );
    }
    Ok(())
}
