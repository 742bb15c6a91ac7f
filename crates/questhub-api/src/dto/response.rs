//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use questhub_auth::TokenPair;
use questhub_entity::fee_split::ShopFeeSplitRecord;
use questhub_entity::shop::Shop;
use questhub_entity::user::User;
use questhub_service::AuthSession;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Tokens issued by register, login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
    /// The signed-in account.
    pub user: User,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        let TokenPair {
            access_token,
            refresh_token,
            token_type,
            access_expires_at,
            refresh_expires_at,
        } = session.tokens;
        Self {
            access_token,
            refresh_token,
            token_type,
            access_expires_at,
            refresh_expires_at,
            user: session.user,
        }
    }
}

/// An approved shop and the registration fee split, when one was charged.
#[derive(Debug, Clone, Serialize)]
pub struct ShopApprovalResponse {
    pub shop: Shop,
    pub fee_split: Option<ShopFeeSplitRecord>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Seconds since the process started.
    pub uptime_seconds: u64,
}

/// Detailed health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// `ok` when every dependency is up, `degraded` otherwise.
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Database status.
    pub database: ComponentHealth,
    /// Cache status.
    pub cache: ComponentHealth,
    /// Storage status.
    pub storage: ComponentHealth,
}

/// Result of probing one dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub healthy: bool,
    /// Provider name, e.g. `redis` or `local`.
    pub provider: String,
    pub latency_ms: u64,
}
