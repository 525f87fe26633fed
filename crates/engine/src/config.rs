//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PM_NOTIFICATION_CAPACITY` - Broadcast buffer per store topic (default: 64)
//! - `PM_REFUND_MAX_ATTEMPTS` - Gateway refund attempts incl. the first (default: 3)
//! - `PM_REFUND_BACKOFF_MS` - Base backoff between refund attempts (default: 200)
//! - `PM_GATEWAY_API_KEY` - Payment gateway API key (enables a live gateway)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::services::orders::RefundRetryPolicy;

const DEFAULT_NOTIFICATION_CAPACITY: usize = 64;
const DEFAULT_REFUND_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_REFUND_BACKOFF_MS: u64 = 200;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Engine configuration.
#[derive(Clone)]
pub struct EngineConfig {
    /// Broadcast buffer size per store topic.
    pub notification_capacity: usize,
    /// Retry policy for the external refund call.
    pub refund_retry: RefundRetryPolicy,
    /// Payment gateway API key (optional; absent means the no-op gateway).
    pub gateway_api_key: Option<SecretString>,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("notification_capacity", &self.notification_capacity)
            .field("refund_retry", &self.refund_retry)
            .field(
                "gateway_api_key",
                &self.gateway_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
            refund_retry: RefundRetryPolicy {
                max_attempts: DEFAULT_REFUND_MAX_ATTEMPTS,
                base_backoff: Duration::from_millis(DEFAULT_REFUND_BACKOFF_MS),
            },
            gateway_api_key: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let notification_capacity =
            parse_env_or("PM_NOTIFICATION_CAPACITY", DEFAULT_NOTIFICATION_CAPACITY)?;
        let max_attempts = parse_env_or("PM_REFUND_MAX_ATTEMPTS", DEFAULT_REFUND_MAX_ATTEMPTS)?;
        let backoff_ms = parse_env_or("PM_REFUND_BACKOFF_MS", DEFAULT_REFUND_BACKOFF_MS)?;
        let gateway_api_key = std::env::var("PM_GATEWAY_API_KEY")
            .ok()
            .map(SecretString::from);

        Ok(Self {
            notification_capacity,
            refund_retry: RefundRetryPolicy {
                max_attempts,
                base_backoff: Duration::from_millis(backoff_ms),
            },
            gateway_api_key,
        })
    }
}

/// Parse an environment variable, falling back to a default when unset.
fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
