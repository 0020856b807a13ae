//! # Core Module
//!
//! Application context, renderer settings, notifications and viewer configuration.

mod context;
mod events;
mod id;
mod renderer;

pub use context::AppContext;
pub use events::{EventQueue, ViewerEvent};
pub use id::NodeId;
pub use renderer::*;

use crate::profile::ProfilePaths;
use serde::{Deserialize, Serialize};

/// Where the viewer finds its documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    /// Profile index and profile document locations.
    pub profiles: ProfilePaths,
    /// Directory holding one folder per model.
    pub models_root: String,
    /// Model index document.
    pub model_index: String,
    /// Startup configuration document.
    pub autostart_path: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            profiles: ProfilePaths::default(),
            models_root: "models".to_string(),
            model_index: "models/index.json".to_string(),
            autostart_path: "autostart.json".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_viewer_config_defaults() {
        let config: ViewerConfig = serde_json::from_value(json!({ "modelsRoot": "assets" })).unwrap();
        assert_eq!(config.models_root, "assets");
        assert_eq!(config.model_index, "models/index.json");
        assert_eq!(config.profiles, ProfilePaths::default());
    }
}
