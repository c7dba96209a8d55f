//! Client configuration.
//!
//! All knobs have defaults that match the public node deployments; a
//! caller only ever has to supply the base URL.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for a node client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Node API base URL (e.g. "https://node2.example.io:6877").
    pub base_url: String,

    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,

    /// Interval between node health probes in seconds.
    pub health_check_interval_secs: u64,

    /// Upper bound for one block-wait attempt in seconds.
    pub block_wait_timeout_secs: u64,

    /// Backoff after a failed block-wait attempt in seconds.
    pub retry_backoff_secs: u64,

    /// Pause between confirmation queries in seconds.
    pub confirmation_poll_secs: u64,

    /// How many upcoming block producers to fetch per wait.
    pub generator_limit: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:6876".to_string(),
            request_timeout_secs: 10,
            health_check_interval_secs: 45,
            block_wait_timeout_secs: 300,
            retry_backoff_secs: 5,
            confirmation_poll_secs: 5,
            generator_limit: 20,
        }
    }
}

impl ClientConfig {
    /// Build a configuration with defaults for the given endpoint.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| ClientError::Config(format!("parse {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.health_check_interval_secs, 45);
        assert_eq!(config.block_wait_timeout_secs, 300);
        assert_eq!(config.generator_limit, 20);
    }

    #[test]
    fn test_partial_toml() {
        let config: ClientConfig =
            toml::from_str("base_url = \"https://node.example:6877\"\nrequest_timeout_secs = 3\n")
                .unwrap();
        assert_eq!(config.base_url, "https://node.example:6877");
        assert_eq!(config.request_timeout_secs, 3);
        // untouched fields keep their defaults
        assert_eq!(config.health_check_interval_secs, 45);
    }
}
