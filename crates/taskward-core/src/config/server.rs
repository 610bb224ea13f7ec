//! HTTP listener configuration.

use serde::{Deserialize, Serialize};

/// Address the REST API binds to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Serve `POST /auth/register`. Callers choose their own role and
    /// organization, so turn this off outside trusted deployments.
    #[serde(default = "default_allow_registration")]
    pub allow_registration: bool,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allow_registration: default_allow_registration(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_allow_registration() -> bool {
    true
}
