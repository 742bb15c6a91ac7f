//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod cache;
pub mod facebook;
pub mod logging;
pub mod marketplace;
pub mod rate_limit;
pub mod storage;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::AuthConfig;
pub use self::cache::CacheConfig;
pub use self::facebook::FacebookConfig;
pub use self::logging::LoggingConfig;
pub use self::marketplace::MarketplaceConfig;
pub use self::rate_limit::RateLimitConfig;
pub use self::storage::StorageConfig;
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Cache provider settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Facebook Graph API settings.
    #[serde(default)]
    pub facebook: FacebookConfig,
    /// Image storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Marketplace business rules.
    #[serde(default)]
    pub marketplace: MarketplaceConfig,
    /// Per-IP request budgets.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Run pending migrations on server start.
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `QUESTHUB__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration from an explicit directory.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("QUESTHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject combinations that would make the server misbehave at runtime.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.url.trim().is_empty() {
            return Err(AppError::configuration("database.url must be set"));
        }
        if self.auth.jwt_secret.len() < 16 {
            return Err(AppError::configuration(
                "auth.jwt_secret must be at least 16 characters",
            ));
        }
        if self.marketplace.cooldown_hours == 0 {
            return Err(AppError::configuration(
                "marketplace.cooldown_hours must be positive",
            ));
        }
        if self.marketplace.default_commission_bps > 10_000 {
            return Err(AppError::configuration(
                "marketplace.default_commission_bps must be within 0..=10000",
            ));
        }
        if self.storage.provider == "gcs" && self.storage.gcs.bucket.is_empty() {
            return Err(AppError::configuration(
                "storage.gcs.bucket must be set when storage.provider = \"gcs\"",
            ));
        }
        if self.facebook.enabled
            && (self.facebook.app_id.is_empty() || self.facebook.app_secret.is_empty())
        {
            return Err(AppError::configuration(
                "facebook.app_id and facebook.app_secret are required when facebook.enabled",
            ));
        }
        Ok(())
    }
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> AppConfig {
        let raw = r#"
            [database]
            url = "postgres://localhost/questhub"
            [auth]
            jwt_secret = "0123456789abcdef0123"
        "#;
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .expect("build");
        cfg.try_deserialize().expect("deserialize")
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let cfg = minimal();
        assert_eq!(cfg.marketplace.cooldown_hours, 4);
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.cache.provider, "memory");
        assert_eq!(cfg.storage.provider, "local");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_secret() {
        let mut cfg = minimal();
        cfg.auth.jwt_secret = "short".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_requires_bucket_for_gcs() {
        let mut cfg = minimal();
        cfg.storage.provider = "gcs".to_string();
        assert!(cfg.validate().is_err());
        cfg.storage.gcs.bucket = "questhub-media".to_string();
        assert!(cfg.validate().is_ok());
    }
}
