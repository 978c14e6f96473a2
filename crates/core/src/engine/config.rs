//! Pipeline engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a pipeline engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Folder tag sent with every upload. The remote service groups
    /// uploaded originals under this name.
    #[serde(default = "default_folder_tag")]
    pub folder_tag: String,

    /// Per-stage timeout in seconds. None lets a stage run as long as the
    /// underlying service call takes.
    #[serde(default)]
    pub stage_timeout_secs: Option<u64>,
}

fn default_folder_tag() -> String {
    "androscaler".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            folder_tag: default_folder_tag(),
            stage_timeout_secs: None,
        }
    }
}
