//! CLI command implementations.

pub mod import;
pub mod migrate;
pub mod reconcile;

use std::path::Path;

use pickupmart_engine::models::NewMerchantProfile;
use thiserror::Error;

/// Errors shared by the file-driven commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Load a JSON array of merchant profiles from disk.
pub fn load_merchants(path: &Path) -> Result<Vec<NewMerchantProfile>, CommandError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CommandError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CommandError::Parse {
        path: path.display().to_string(),
        source,
    })
}
