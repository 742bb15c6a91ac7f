//! Rate limiting configuration.

use serde::{Deserialize, Serialize};

/// Fixed-window request budgets per client IP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether rate limiting is applied.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Window length in seconds.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
    /// Requests allowed per window on general routes.
    #[serde(default = "default_general")]
    pub general_limit: u64,
    /// Requests allowed per window on authentication and public
    /// submission routes.
    #[serde(default = "default_strict")]
    pub strict_limit: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_seconds: default_window(),
            general_limit: default_general(),
            strict_limit: default_strict(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_window() -> u64 {
    60
}

fn default_general() -> u64 {
    300
}

fn default_strict() -> u64 {
    20
}
