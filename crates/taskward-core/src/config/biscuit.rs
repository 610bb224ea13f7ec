//! Biscuit token configuration.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for Biscuit token handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiscuitConfig {
    /// Environment variable containing the private key (hex-encoded).
    #[serde(default)]
    pub private_key_env: Option<String>,

    /// Path to the private key file.
    #[serde(default)]
    pub private_key_file: Option<PathBuf>,

    /// Lifetime of tokens issued at login (e.g. "24h", "30m").
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime: String,
}

impl BiscuitConfig {
    /// Resolve the private key from environment or file.
    pub fn resolve_private_key(&self) -> Result<Option<String>, std::io::Error> {
        if let Some(env_var) = &self.private_key_env
            && let Ok(key) = std::env::var(env_var)
        {
            return Ok(Some(key.trim().to_string()));
        }

        if let Some(path) = &self.private_key_file
            && path.exists()
        {
            let key = std::fs::read_to_string(path)?;
            return Ok(Some(key.trim().to_string()));
        }

        Ok(None)
    }

    /// Parsed `token_lifetime`.
    pub fn token_lifetime(&self) -> Result<Duration, ConfigError> {
        humantime::parse_duration(&self.token_lifetime).map_err(|e| {
            ConfigError::Config(format!(
                "invalid biscuit.token_lifetime '{}': {e}",
                self.token_lifetime
            ))
        })
    }
}

impl Default for BiscuitConfig {
    fn default() -> Self {
        Self {
            private_key_env: None,
            private_key_file: None,
            token_lifetime: default_token_lifetime(),
        }
    }
}

fn default_token_lifetime() -> String {
    "24h".to_string()
}
