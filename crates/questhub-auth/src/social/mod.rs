//! Third-party identity verification.

pub mod facebook;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use questhub_core::result::AppResult;

pub use facebook::FacebookVerifier;

/// Identity asserted by a verified third-party token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialProfile {
    /// The provider's user id.
    pub provider_user_id: String,
    /// Display name, when shared.
    pub name: Option<String>,
    /// Email, when shared.
    pub email: Option<String>,
}

/// Verifies a client-supplied access token with its issuer.
#[async_trait]
pub trait SocialTokenVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Return the identity behind `access_token`, or an authentication error
    /// if the token is invalid or was issued to another application.
    async fn verify(&self, access_token: &str) -> AppResult<SocialProfile>;
}
