//! Facebook Graph API configuration.

use serde::{Deserialize, Serialize};

/// Credentials and endpoint used to verify Facebook user access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacebookConfig {
    /// Whether Facebook login is offered.
    #[serde(default)]
    pub enabled: bool,
    /// Graph API base URL, including the version segment.
    #[serde(default = "default_graph_url")]
    pub graph_url: String,
    /// Facebook app id.
    #[serde(default)]
    pub app_id: String,
    /// Facebook app secret.
    #[serde(default)]
    pub app_secret: String,
    /// HTTP timeout for Graph API calls in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for FacebookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            graph_url: default_graph_url(),
            app_id: String::new(),
            app_secret: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_graph_url() -> String {
    "https://graph.facebook.com/v19.0".to_string()
}

fn default_timeout() -> u64 {
    10
}
