//! HMAC-signed download URLs for the local provider.
//!
//! A URL carries `expires` (unix seconds) and `signature`, the hex
//! HMAC-SHA256 of `"{key}\n{expires}"` under the configured secret.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use questhub_core::error::AppError;
use questhub_core::result::AppResult;

type HmacSha256 = Hmac<Sha256>;

/// Path under which signed media is served.
pub const MEDIA_ROUTE_PREFIX: &str = "/api/media/files";

/// Signs and verifies media download URLs.
#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
    base_url: String,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl UrlSigner {
    /// Create a signer for URLs rooted at `base_url`.
    pub fn new(secret: &str, base_url: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn mac(&self, key: &str, expires: i64) -> AppResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::internal(format!("Invalid signing key: {e}")))?;
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }

    /// Hex signature for `key` valid until `expires`.
    pub fn signature(&self, key: &str, expires: i64) -> AppResult<String> {
        Ok(hex::encode(self.mac(key, expires)?.finalize().into_bytes()))
    }

    /// Full download URL for `key`, valid until `expires_at`.
    pub fn sign(&self, key: &str, expires_at: DateTime<Utc>) -> AppResult<String> {
        let expires = expires_at.timestamp();
        Ok(format!(
            "{}{MEDIA_ROUTE_PREFIX}/{key}?expires={expires}&signature={}",
            self.base_url,
            self.signature(key, expires)?
        ))
    }

    /// Check a presented signature. Fails with an authorization error when
    /// the URL expired or the signature does not match.
    pub fn verify(
        &self,
        key: &str,
        expires: i64,
        signature: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if now.timestamp() > expires {
            return Err(AppError::authorization("Signed URL has expired"));
        }
        let presented = hex::decode(signature)
            .map_err(|_| AppError::authorization("Invalid URL signature"))?;
        self.mac(key, expires)?
            .verify_slice(&presented)
            .map_err(|_| AppError::authorization("Invalid URL signature"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn signer() -> UrlSigner {
        UrlSigner::new("test-signing-secret", "https://api.example.com/")
    }

    #[test]
    fn test_signed_url_shape() {
        let expires = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let url = signer().sign("shop/abc/1.jpg", expires).unwrap();
        assert!(url.starts_with(
            "https://api.example.com/api/media/files/shop/abc/1.jpg?expires=1700000000&signature="
        ));
    }

    #[test]
    fn test_verify_accepts_fresh_signature() {
        let s = signer();
        let now = Utc::now();
        let expires = (now + Duration::minutes(5)).timestamp();
        let sig = s.signature("quest/x.png", expires).unwrap();
        assert!(s.verify("quest/x.png", expires, &sig, now).is_ok());
    }

    #[test]
    fn test_verify_rejects_tampering_and_expiry() {
        let s = signer();
        let now = Utc::now();
        let expires = (now + Duration::minutes(5)).timestamp();
        let sig = s.signature("quest/x.png", expires).unwrap();

        assert!(s.verify("quest/y.png", expires, &sig, now).is_err());
        assert!(s.verify("quest/x.png", expires + 1, &sig, now).is_err());
        assert!(s.verify("quest/x.png", expires, "zz", now).is_err());
        assert!(
            s.verify("quest/x.png", expires, &sig, now + Duration::minutes(6))
                .is_err()
        );
    }

    #[test]
    fn test_different_secret_does_not_verify() {
        let now = Utc::now();
        let expires = (now + Duration::minutes(1)).timestamp();
        let sig = signer().signature("k", expires).unwrap();
        let other = UrlSigner::new("another-secret", "http://x");
        assert!(other.verify("k", expires, &sig, now).is_err());
    }
}
