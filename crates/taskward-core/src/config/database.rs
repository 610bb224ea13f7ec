//! Storage backend configuration.

use serde::{Deserialize, Serialize};

/// Which repository implementation backs the service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    /// Process-local maps; contents are lost on restart.
    #[default]
    Memory,
    /// SQLite database via sqlx.
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,

    /// Connection URL (only used by the sqlite backend).
    #[serde(default = "default_url")]
    pub url: String,

    /// Environment variable that overrides `url` when set.
    #[serde(default)]
    pub url_env: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// The effective connection URL, preferring `url_env` when it is set.
    pub fn resolve_url(&self) -> String {
        self.url_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.url.clone())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::default(),
            url: default_url(),
            url_env: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_url() -> String {
    "sqlite://data/taskward.sqlite".to_string()
}

fn default_max_connections() -> u32 {
    5
}
