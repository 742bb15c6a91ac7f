//! JWT token validation and revocation.

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::warn;
use uuid::Uuid;

use questhub_cache::{CacheManager, keys};
use questhub_core::config::AuthConfig;
use questhub_core::error::AppError;
use questhub_core::traits::CacheProvider;

use super::claims::{Claims, TokenType};

/// Validates JWT tokens and checks revocation state in the cache.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
    /// Longest lifetime any token can have; bounds revocation markers.
    max_token_ttl: Duration,
    /// Cache for blocklist lookups.
    cache: CacheManager,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig, cache: CacheManager) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // seconds of clock skew

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            max_token_ttl: Duration::from_secs(config.jwt_refresh_ttl_hours * 3600),
            cache,
        }
    }

    /// Decodes and validates an access token string.
    ///
    /// Checks:
    /// 1. Signature validity
    /// 2. Expiration
    /// 3. Token type is Access
    /// 4. Not revoked
    pub async fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_typed(token, TokenType::Access).await
    }

    /// Decodes and validates a refresh token string.
    pub async fn decode_refresh_token(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_typed(token, TokenType::Refresh).await
    }

    async fn decode_typed(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let claims = self.decode_token(token)?;
        if claims.token_type != expected {
            return Err(AppError::authentication(format!(
                "Invalid token type: expected {expected:?} token"
            )));
        }
        self.check_revoked(&claims).await?;
        Ok(claims)
    }

    /// Signature and expiry check without type or revocation checks.
    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::authentication("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    _ => AppError::authentication("Invalid token"),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Rejects blocklisted token ids and tokens issued before a user-wide
    /// revocation. A cache outage is logged and treated as not revoked.
    async fn check_revoked(&self, claims: &Claims) -> Result<(), AppError> {
        match self.cache.exists(&keys::jwt_blocklist(claims.jti)).await {
            Ok(true) => return Err(AppError::authentication("Token has been revoked")),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Token blocklist lookup failed"),
        }

        match self
            .cache
            .get(&keys::user_tokens_revoked_at(claims.sub))
            .await
        {
            Ok(Some(raw)) => {
                if raw.parse::<i64>().is_ok_and(|cutoff| claims.iat < cutoff) {
                    return Err(AppError::authentication("Token has been revoked"));
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Token revocation lookup failed"),
        }
        Ok(())
    }

    /// Blocklists a single token until it would have expired.
    pub async fn blocklist_token(&self, claims: &Claims) -> Result<(), AppError> {
        // Keep the marker a little past expiry to cover clock skew.
        let ttl = Duration::from_secs(claims.remaining_ttl_seconds() + 60);
        self.cache
            .set(&keys::jwt_blocklist(claims.jti), "revoked", ttl)
            .await
    }

    /// Revokes every token issued to a user up to now, e.g. after a role or
    /// status change.
    pub async fn revoke_user_tokens(&self, user_id: Uuid) -> Result<(), AppError> {
        // Tokens issued in the current second survive; iat has second precision.
        let cutoff = chrono::Utc::now().timestamp();
        self.cache
            .set(
                &keys::user_tokens_revoked_at(user_id),
                &cutoff.to_string(),
                self.max_token_ttl,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::encoder::JwtEncoder;
    use std::sync::Arc;

    use questhub_cache::memory::MemoryCacheProvider;
    use questhub_core::config::cache::MemoryCacheConfig;
    use questhub_entity::user::UserRole;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "a-test-secret-that-is-long-enough".to_string(),
            ..AuthConfig::default()
        }
    }

    fn memory_cache() -> CacheManager {
        let provider = MemoryCacheProvider::new(&MemoryCacheConfig::default(), 60);
        CacheManager::from_provider(Arc::new(provider))
    }

    async fn decoder() -> JwtDecoder {
        JwtDecoder::new(&auth_config(), memory_cache())
    }

    #[tokio::test]
    async fn test_roundtrip_and_type_check() {
        let encoder = JwtEncoder::new(&auth_config());
        let decoder = decoder().await;
        let user_id = Uuid::now_v7();
        let pair = encoder
            .generate_token_pair(user_id, UserRole::Partner, "somchai")
            .unwrap();

        let claims = decoder.decode_access_token(&pair.access_token).await.unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, UserRole::Partner);

        assert!(decoder.decode_refresh_token(&pair.access_token).await.is_err());
        assert!(decoder.decode_access_token(&pair.refresh_token).await.is_err());
        assert!(decoder.decode_refresh_token(&pair.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_secret_is_rejected() {
        let other = JwtEncoder::new(&AuthConfig {
            jwt_secret: "a-completely-different-secret".to_string(),
            ..AuthConfig::default()
        });
        let pair = other
            .generate_token_pair(Uuid::now_v7(), UserRole::User, "x")
            .unwrap();
        let err = decoder()
            .await
            .decode_access_token(&pair.access_token)
            .await
            .unwrap_err();
        assert_eq!(err.kind, questhub_core::error::ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_blocklisted_token_is_rejected() {
        let encoder = JwtEncoder::new(&auth_config());
        let decoder = decoder().await;
        let pair = encoder
            .generate_token_pair(Uuid::now_v7(), UserRole::User, "x")
            .unwrap();
        let claims = decoder.decode_access_token(&pair.access_token).await.unwrap();

        decoder.blocklist_token(&claims).await.unwrap();
        assert!(decoder.decode_access_token(&pair.access_token).await.is_err());
    }

    #[tokio::test]
    async fn test_user_revocation_cuts_off_older_tokens() {
        let encoder = JwtEncoder::new(&auth_config());
        let decoder = decoder().await;
        let user_id = Uuid::now_v7();
        let pair = encoder
            .generate_token_pair(user_id, UserRole::User, "x")
            .unwrap();

        // Place the cutoff after the token's issue time.
        let claims = decoder.decode_access_token(&pair.access_token).await.unwrap();
        decoder
            .cache
            .set(
                &keys::user_tokens_revoked_at(user_id),
                &(claims.iat + 1).to_string(),
                Duration::from_secs(60),
            )
            .await
            .unwrap();
        assert!(decoder.decode_access_token(&pair.access_token).await.is_err());
    }

    #[tokio::test]
    async fn test_garbage_token() {
        let decoder = decoder().await;
        assert!(decoder.decode_token("not.a.jwt").is_err());
        assert!(decoder.decode_access_token("").await.is_err());
    }
}
