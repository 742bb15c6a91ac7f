//! Facebook user access token verification via the Graph API.
//!
//! 1. `GET /debug_token?input_token=..&access_token={app_id}|{app_secret}`
//!    must report the token valid and issued for our app.
//! 2. `GET /me?fields=id,name,email` with the user token returns the profile.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use questhub_core::config::FacebookConfig;
use questhub_core::error::{AppError, ErrorKind};
use questhub_core::result::AppResult;

use super::{SocialProfile, SocialTokenVerifier};

#[derive(Debug, Deserialize)]
struct DebugTokenEnvelope {
    data: DebugTokenData,
}

#[derive(Debug, Deserialize)]
struct DebugTokenData {
    #[serde(default)]
    app_id: Option<String>,
    #[serde(default)]
    is_valid: bool,
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Verifies Facebook user tokens for the configured app.
#[derive(Clone)]
pub struct FacebookVerifier {
    client: Client,
    graph_url: String,
    app_id: String,
    app_secret: String,
    enabled: bool,
}

impl std::fmt::Debug for FacebookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacebookVerifier")
            .field("graph_url", &self.graph_url)
            .field("app_id", &self.app_id)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl FacebookVerifier {
    /// Build a verifier from configuration.
    pub fn new(config: &FacebookConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;
        Ok(Self {
            client,
            graph_url: config.graph_url.trim_end_matches('/').to_string(),
            app_id: config.app_id.clone(),
            app_secret: config.app_secret.clone(),
            enabled: config.enabled,
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> AppResult<Url> {
        Url::parse_with_params(&format!("{}/{path}", self.graph_url), params)
            .map_err(|e| AppError::configuration(format!("Invalid facebook.graph_url: {e}")))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: Url,
        what: &str,
    ) -> AppResult<(StatusCode, Option<T>)> {
        let response = self.client.get(url).send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Facebook {what} request failed"),
                e,
            )
        })?;
        let status = response.status();
        if !status.is_success() {
            return Ok((status, None));
        }
        let body = response.json::<T>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Unexpected Facebook {what} response"),
                e,
            )
        })?;
        Ok((status, Some(body)))
    }
}

/// Accept a `debug_token` result only if it is valid for `app_id`.
/// Returns the token's user id.
fn check_debug_token(data: &DebugTokenData, app_id: &str) -> AppResult<String> {
    if !data.is_valid {
        return Err(AppError::authentication("Facebook token is invalid or expired"));
    }
    if data.app_id.as_deref() != Some(app_id) {
        return Err(AppError::authentication(
            "Facebook token was issued for a different application",
        ));
    }
    data.user_id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::authentication("Facebook token has no user"))
}

#[async_trait]
impl SocialTokenVerifier for FacebookVerifier {
    async fn verify(&self, access_token: &str) -> AppResult<SocialProfile> {
        if !self.enabled {
            return Err(AppError::service_unavailable("Facebook login is disabled"));
        }
        if access_token.trim().is_empty() {
            return Err(AppError::validation("Facebook access token is required"));
        }

        let app_token = format!("{}|{}", self.app_id, self.app_secret);
        let url = self.endpoint(
            "debug_token",
            &[("input_token", access_token), ("access_token", &app_token)],
        )?;
        let (status, envelope) = self.get_json::<DebugTokenEnvelope>(url, "debug_token").await?;
        let Some(envelope) = envelope else {
            warn!(%status, "Facebook rejected the debug_token call");
            return Err(AppError::external("Facebook token verification is unavailable"));
        };
        let user_id = check_debug_token(&envelope.data, &self.app_id)?;

        let url = self.endpoint(
            "me",
            &[("fields", "id,name,email"), ("access_token", access_token)],
        )?;
        let (status, me) = self.get_json::<MeResponse>(url, "profile").await?;
        let Some(me) = me else {
            return Err(if status.is_client_error() {
                AppError::authentication("Facebook token was rejected")
            } else {
                AppError::external(format!("Facebook profile lookup failed with {status}"))
            });
        };
        if me.id != user_id {
            return Err(AppError::authentication("Facebook token user mismatch"));
        }

        debug!(facebook_id = %me.id, "Verified Facebook token");
        Ok(SocialProfile {
            provider_user_id: me.id,
            name: me.name,
            email: me.email.map(|e| e.to_lowercase()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(json: &str) -> DebugTokenData {
        serde_json::from_str::<DebugTokenEnvelope>(json).unwrap().data
    }

    #[test]
    fn test_valid_token_for_our_app() {
        let d = data(r#"{"data":{"app_id":"123","type":"USER","is_valid":true,"user_id":"987"}}"#);
        assert_eq!(check_debug_token(&d, "123").unwrap(), "987");
    }

    #[test]
    fn test_token_for_other_app_is_rejected() {
        let d = data(r#"{"data":{"app_id":"555","is_valid":true,"user_id":"987"}}"#);
        let err = check_debug_token(&d, "123").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let d = data(r#"{"data":{"is_valid":false,"error":{"code":190}}}"#);
        assert!(check_debug_token(&d, "123").is_err());
    }

    #[tokio::test]
    async fn test_disabled_verifier() {
        let verifier = FacebookVerifier::new(&FacebookConfig::default()).unwrap();
        let err = verifier.verify("token").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
    }

    #[test]
    fn test_endpoint_escapes_params() {
        let verifier = FacebookVerifier::new(&FacebookConfig::default()).unwrap();
        let url = verifier
            .endpoint("debug_token", &[("input_token", "a&b"), ("access_token", "1|s")])
            .unwrap();
        assert!(url.as_str().ends_with("/debug_token?input_token=a%26b&access_token=1%7Cs"));
    }
}
