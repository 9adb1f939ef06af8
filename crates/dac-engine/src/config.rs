//! Engine configuration.
//!
//! Timeouts for the three external calls. Defaults suit a local ledger
//! node; override via environment variables or explicit construction.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-port timeouts. Expiry is reported as the port being unavailable;
/// the engine never retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Ledger reads and writes. Default: 10s.
    pub ledger_timeout: Duration,
    /// Field ordering lookups. Default: 5s.
    pub ordering_timeout: Duration,
    /// Signing key resolution. Default: 5s.
    pub key_store_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ledger_timeout: Duration::from_secs(10),
            ordering_timeout: Duration::from_secs(5),
            key_store_timeout: Duration::from_secs(5),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables (whole seconds, must be > 0):
    /// - `DAC_LEDGER_TIMEOUT_SECS` (default: 10)
    /// - `DAC_ORDERING_TIMEOUT_SECS` (default: 5)
    /// - `DAC_KEYSTORE_TIMEOUT_SECS` (default: 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            ledger_timeout: secs(&lookup, "DAC_LEDGER_TIMEOUT_SECS", defaults.ledger_timeout)?,
            ordering_timeout: secs(
                &lookup,
                "DAC_ORDERING_TIMEOUT_SECS",
                defaults.ordering_timeout,
            )?,
            key_store_timeout: secs(
                &lookup,
                "DAC_KEYSTORE_TIMEOUT_SECS",
                defaults.key_store_timeout,
            )?,
        })
    }
}

fn secs<F>(lookup: &F, var: &str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid(var.to_string(), "must be > 0".to_string())),
        Ok(n) => Ok(Duration::from_secs(n)),
        Err(e) => Err(ConfigError::Invalid(var.to_string(), format!("{raw:?}: {e}"))),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}
