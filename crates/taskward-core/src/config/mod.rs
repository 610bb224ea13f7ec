//! Configuration types for Taskward.
//!
//! Everything is read from a single YAML file (`taskward.yaml` by default)
//! into [`TaskwardConfig`]. Every section has defaults, so an empty file is a
//! valid configuration that serves from an in-memory store.

pub mod audit;
pub mod biscuit;
pub mod database;
pub mod seed;
pub mod server;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use audit::{AuditConfig, DEFAULT_RETAINED_EVENTS};
pub use biscuit::BiscuitConfig;
pub use database::{DatabaseBackend, DatabaseConfig};
pub use seed::{SeedConfig, SeedOrganization, SeedTask, SeedUser};
pub use server::ServerConfig;

/// Environment variable that may point at the configuration file.
pub const CONFIG_ENV: &str = "TASKWARD_CONFIG";

/// File looked up in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "taskward.yaml";

/// Complete Taskward configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskwardConfig {
    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Token signing keys and lifetime.
    #[serde(default)]
    pub biscuit: BiscuitConfig,

    /// Audit trail.
    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Initial organizations, users and tasks.
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TaskwardConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content and validate it.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration file and load it.
    ///
    /// Precedence: the explicit path, then `TASKWARD_CONFIG`, then
    /// `taskward.yaml` in the working directory. When no file is found the
    /// defaults are returned.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match Self::resolve_path(explicit) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(CONFIG_ENV)
            && !path.trim().is_empty()
        {
            return Some(PathBuf::from(path));
        }
        let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
        fallback.exists().then_some(fallback)
    }

    /// Cross-section checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.biscuit.token_lifetime()?;
        if self.audit.max_query_results == 0 {
            return Err(ConfigError::Config(
                "audit.max_query_results must be greater than zero".to_string(),
            ));
        }
        if self.audit.retained_events == 0 {
            return Err(ConfigError::Config(
                "audit.retained_events must be greater than zero".to_string(),
            ));
        }
        self.seed.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn empty_document_yields_defaults() {
        let config = TaskwardConfig::from_yaml("{}").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.backend, DatabaseBackend::Memory);
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.audit.max_query_results, 1000);
        assert_eq!(config.audit.retained_events, 10_000);
        assert_eq!(
            config.biscuit.token_lifetime().unwrap(),
            Duration::from_secs(24 * 3600)
        );
    }

    #[test]
    fn parses_full_document() {
        let yaml = r#"
server:
  host: 127.0.0.1
  port: 8080
database:
  backend: sqlite
  url: "sqlite::memory:"
biscuit:
  private_key_env: TASKWARD_KEY
  token_lifetime: 2h
audit:
  stdout: false
  file_path: logs/audit.jsonl
observability:
  log_level: debug
seed:
  organizations:
    - id: 1
      name: HQ
    - id: 2
      name: Engineering
      parent_id: 1
  users:
    - email: owner@example.com
      password: secret
      first_name: Olive
      last_name: Owner
      role: Owner
      organization_id: 1
"#;
        let config = TaskwardConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.database.backend, DatabaseBackend::Sqlite);
        assert_eq!(
            config.biscuit.token_lifetime().unwrap(),
            Duration::from_secs(7200)
        );
        assert_eq!(config.seed.organizations.len(), 2);
        assert_eq!(config.seed.users[0].role, crate::Role::Owner);
    }

    #[test]
    fn invalid_lifetime_is_a_config_error() {
        let err = TaskwardConfig::from_yaml("biscuit:\n  token_lifetime: forever\n").unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }

    #[test]
    fn zero_audit_retention_is_rejected() {
        let err = TaskwardConfig::from_yaml("audit:\n  retained_events: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }

    #[test]
    fn from_file_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taskward.yaml");
        fs::write(&path, "server:\n  port: 4000\n").unwrap();

        let config = TaskwardConfig::load(Some(&path)).unwrap();
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = TaskwardConfig::from_file("/nonexistent/taskward.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn example_config_is_valid() {
        let config =
            TaskwardConfig::from_yaml(include_str!("../../../../config/taskward.example.yaml"))
                .unwrap();
        assert_eq!(config.database.backend, DatabaseBackend::Sqlite);
        assert!(config.server.allow_registration);
        assert_eq!(config.seed.organizations.len(), 2);
        assert_eq!(config.seed.users.len(), 3);
        assert_eq!(config.seed.tasks.len(), 5);
    }
}
