//! Pickupmart CLI - Migrations, merchant imports, and drift reconciliation.
//!
//! # Usage
//!
//! ```bash
//! # Apply schema/seed migrations and show what ran
//! pm-cli migrate
//!
//! # Provision merchants from a JSON file
//! pm-cli import -f merchants.json
//!
//! # Load raw profiles (no provisioning) and run a reconciliation sweep
//! pm-cli reconcile -f merchants.json
//! ```
//!
//! # Commands
//!
//! - `migrate` - Apply pending migrations
//! - `import` - Provision merchants from a JSON export
//! - `reconcile` - Seed raw profiles and sweep the drift

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pm-cli")]
#[command(author, version, about = "Pickupmart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending schema/seed migrations
    Migrate,
    /// Provision merchants from a JSON export file
    Import {
        /// Path to a JSON array of merchant profiles
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Load raw profiles without provisioning, then run a drift sweep
    Reconcile {
        /// Path to a JSON array of merchant profiles
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Import { file } => commands::import::run(&file).await?,
        Commands::Reconcile { file } => commands::reconcile::run(&file).await?,
    }
    Ok(())
}
