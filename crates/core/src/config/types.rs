use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Remote processing service connection.
    #[serde(default)]
    pub remote: RemoteServiceConfig,
    /// Pipeline engine behavior.
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Remote processing service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteServiceConfig {
    /// Service base URL (e.g., "http://localhost:8000")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds. None means calls may block indefinitely,
    /// matching the original client behavior.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for RemoteServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.remote.base_url, "http://localhost:8000");
        assert!(config.remote.request_timeout_secs.is_none());
        assert_eq!(config.engine.folder_tag, "androscaler");
        assert!(config.engine.stage_timeout_secs.is_none());
    }
}
