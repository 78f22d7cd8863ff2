//! Endpoints of the external resume parser and AI analyzer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// External collaborator endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorsConfig {
    /// Resume parser service.
    #[serde(default = "default_parser")]
    pub parser: EndpointConfig,
    /// AI analyzer service.
    #[serde(default = "default_analyzer")]
    pub analyzer: EndpointConfig,
}

impl Default for CollaboratorsConfig {
    fn default() -> Self {
        Self {
            parser: default_parser(),
            analyzer: default_analyzer(),
        }
    }
}

/// A single HTTP collaborator endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EndpointConfig {
    /// Base URL the client posts to.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl EndpointConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_parser() -> EndpointConfig {
    EndpointConfig {
        url: "http://localhost:9100/parse".to_string(),
        timeout_seconds: 30,
    }
}

fn default_analyzer() -> EndpointConfig {
    EndpointConfig {
        url: "http://localhost:9200/analyze".to_string(),
        timeout_seconds: 60,
    }
}
