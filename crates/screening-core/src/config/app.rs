//! HTTP server configuration.

use serde::{Deserialize, Serialize};

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body in bytes (multipart batches included).
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: u64,
    /// Allowed CORS origins (use `["*"]` for development only).
    #[serde(default = "default_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
            cors_allowed_origins: default_allowed_origins(),
        }
    }
}

impl ServerConfig {
    /// The `host:port` string to bind to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> u64 {
    256 * 1024 * 1024
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}
