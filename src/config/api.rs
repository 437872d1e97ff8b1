use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the marketplace backend lives.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout; requests wait indefinitely when unset.
    #[serde(default)]
    pub timeout_in_ms: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            timeout_in_ms: None,
        }
    }
}
