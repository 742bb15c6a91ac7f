//! Registration, login, Facebook sign-in, refresh and logout.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use questhub_auth::jwt::{Claims, JwtDecoder, JwtEncoder, TokenPair};
use questhub_auth::password::{PasswordHasher, PasswordValidator};
use questhub_auth::social::{SocialProfile, SocialTokenVerifier};
use questhub_core::config::AuthConfig;
use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_database::repositories::UserRepository;
use questhub_entity::user::{CreateUser, User, UserRole};

use crate::validate;

/// Usernames generated for social sign-ups are truncated to this many
/// characters before a numeric suffix is added.
const SOCIAL_USERNAME_BASE_LEN: usize = 40;

/// Attempts at finding a free generated username.
const SOCIAL_USERNAME_ATTEMPTS: u32 = 20;

/// Input for password registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Desired username.
    pub username: String,
    /// Optional email.
    pub email: Option<String>,
    /// Password.
    pub password: String,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Optional phone.
    pub phone: Option<String>,
    /// Optional home province.
    pub province: Option<String>,
}

/// A signed-in account and its tokens.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    /// The account.
    pub user: User,
    /// Fresh token pair.
    pub tokens: TokenPair,
}

/// Authenticates accounts and manages their tokens.
#[derive(Debug, Clone)]
pub struct AuthService {
    user_repo: Arc<UserRepository>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
    social: Arc<dyn SocialTokenVerifier>,
    max_failed_attempts: i32,
    lockout_minutes: i32,
}

impl AuthService {
    /// Creates a new auth service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<UserRepository>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        social: Arc<dyn SocialTokenVerifier>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            validator,
            encoder,
            decoder,
            social,
            max_failed_attempts: config.max_failed_attempts.max(1),
            lockout_minutes: i32::try_from(config.lockout_duration_minutes).unwrap_or(i32::MAX),
        }
    }

    /// Create a consumer account with a password and sign it in.
    pub async fn register(&self, req: RegisterRequest) -> AppResult<AuthSession> {
        let username = validate::username(&req.username)?;
        let email = validate::optional_email(req.email.as_deref())?;
        let province = validate::optional_province(req.province.as_deref())?;

        let mut inputs = vec![username.as_str()];
        if let Some(email) = email.as_deref() {
            inputs.push(email);
        }
        self.validator.validate(&req.password, &inputs)?;

        if self.user_repo.username_exists(&username).await? {
            return Err(AppError::conflict(format!(
                "Username '{username}' is already taken"
            )));
        }

        let password_hash = self.hasher.hash_password_blocking(req.password).await?;
        let user = self
            .user_repo
            .create(&CreateUser {
                username,
                email,
                phone: validate::trimmed(req.phone),
                password_hash: Some(password_hash),
                facebook_id: None,
                display_name: validate::trimmed(req.display_name),
                province,
                role: UserRole::User,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        self.issue(user)
    }

    /// Password login by username or email.
    pub async fn login(&self, login: &str, password: &str) -> AppResult<AuthSession> {
        let invalid = || AppError::authentication("Invalid username or password");

        let user = self
            .user_repo
            .find_by_login(login.trim())
            .await?
            .ok_or_else(invalid)?;

        if !user.status.can_login() {
            return Err(AppError::authentication(format!(
                "Account is {}",
                user.status
            )));
        }
        if user.is_locked() {
            return Err(AppError::authentication(
                "Account is temporarily locked after too many failed attempts",
            ));
        }

        let Some(hash) = user.password_hash.clone() else {
            return Err(AppError::authentication(
                "This account signs in with Facebook",
            ));
        };

        let valid = self
            .hasher
            .verify_password_blocking(password.to_string(), hash)
            .await?;
        if !valid {
            let locked_until = self
                .user_repo
                .record_failed_login(user.id, self.max_failed_attempts, self.lockout_minutes)
                .await?;
            if let Some(until) = locked_until.filter(|u| *u > chrono::Utc::now()) {
                warn!(
                    user_id = %user.id,
                    locked_until = %until,
                    "Account locked after failed logins"
                );
            }
            return Err(invalid());
        }

        self.user_repo.record_successful_login(user.id).await?;
        info!(user_id = %user.id, "User logged in");
        self.issue(user)
    }

    /// Sign in with a Facebook user access token.
    ///
    /// The account is found by Facebook id, else linked by matching email,
    /// else created as a consumer account.
    pub async fn facebook_login(&self, access_token: &str) -> AppResult<AuthSession> {
        if access_token.trim().is_empty() {
            return Err(AppError::validation("access_token is required"));
        }
        let profile = self.social.verify(access_token.trim()).await?;

        let user = match self
            .user_repo
            .find_by_facebook_id(&profile.provider_user_id)
            .await?
        {
            Some(user) => user,
            None => self.link_or_create(&profile).await?,
        };

        if !user.can_login() {
            return Err(AppError::authentication(format!(
                "Account is {}",
                user.status
            )));
        }

        self.user_repo.record_successful_login(user.id).await?;
        info!(user_id = %user.id, "User logged in with Facebook");
        self.issue(user)
    }

    async fn link_or_create(&self, profile: &SocialProfile) -> AppResult<User> {
        if let Some(email) = profile.email.as_deref() {
            if let Some(existing) = self.user_repo.find_by_email(email).await? {
                let linked = self
                    .user_repo
                    .link_facebook(existing.id, &profile.provider_user_id)
                    .await?;
                info!(user_id = %linked.id, "Linked Facebook account by email");
                return Ok(linked);
            }
        }

        let username = self.free_username(profile).await?;
        let user = self
            .user_repo
            .create(&CreateUser {
                username,
                email: profile.email.clone(),
                phone: None,
                password_hash: None,
                facebook_id: Some(profile.provider_user_id.clone()),
                display_name: profile.name.clone(),
                province: None,
                role: UserRole::User,
            })
            .await?;
        info!(user_id = %user.id, username = %user.username, "User registered with Facebook");
        Ok(user)
    }

    async fn free_username(&self, profile: &SocialProfile) -> AppResult<String> {
        let base = social_username_base(profile);
        if !self.user_repo.username_exists(&base).await? {
            return Ok(base);
        }
        for _ in 0..SOCIAL_USERNAME_ATTEMPTS {
            let candidate = format!("{base}_{:04}", rand::random_range(0..10_000u32));
            if !self.user_repo.username_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(AppError::conflict("Could not allocate a username, please retry"))
    }

    /// Exchange a refresh token for a new pair. The presented token is
    /// revoked and the role is re-read so promotions take effect.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthSession> {
        let claims = self.decoder.decode_refresh_token(refresh_token).await?;
        let user = self
            .user_repo
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| AppError::authentication("Account no longer exists"))?;

        if !user.can_login() {
            return Err(AppError::authentication(format!(
                "Account is {}",
                user.status
            )));
        }

        self.decoder.blocklist_token(&claims).await?;
        self.issue(user)
    }

    /// Revoke an access token and, when given, its refresh token.
    pub async fn logout(&self, access: &Claims, refresh_token: Option<&str>) -> AppResult<()> {
        self.decoder.blocklist_token(access).await?;
        if let Some(token) = refresh_token.filter(|t| !t.is_empty()) {
            match self.decoder.decode_refresh_token(token).await {
                Ok(claims) if claims.sub == access.sub => {
                    self.decoder.blocklist_token(&claims).await?;
                }
                Ok(_) => {
                    return Err(AppError::authorization(
                        "Refresh token belongs to another account",
                    ));
                }
                // Already expired or revoked: nothing left to do.
                Err(_) => {}
            }
        }
        info!(user_id = %access.user_id(), "User logged out");
        Ok(())
    }

    fn issue(&self, user: User) -> AppResult<AuthSession> {
        let tokens = self
            .encoder
            .generate_token_pair(user.id, user.role, &user.username)?;
        Ok(AuthSession { user, tokens })
    }
}

/// Derive a username from a social profile: the lowercased name with
/// non-alphanumerics collapsed to `_`, or `fb_{id}`.
fn social_username_base(profile: &SocialProfile) -> String {
    let from_name: String = profile
        .name
        .as_deref()
        .unwrap_or_default()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let collapsed = from_name
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    let base = if collapsed.len() >= 3 {
        collapsed
    } else {
        format!("fb_{}", profile.provider_user_id)
    };
    base.chars().take(SOCIAL_USERNAME_BASE_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: Option<&str>) -> SocialProfile {
        SocialProfile {
            provider_user_id: "10223344".to_string(),
            name: name.map(String::from),
            email: None,
        }
    }

    #[test]
    fn test_social_username_from_name() {
        assert_eq!(social_username_base(&profile(Some("Somchai  Jaidee"))), "somchai_jaidee");
        assert_eq!(social_username_base(&profile(Some("Anna-Lee O'Neil"))), "anna_lee_o_neil");
    }

    #[test]
    fn test_social_username_falls_back_to_id() {
        assert_eq!(social_username_base(&profile(None)), "fb_10223344");
        // Thai script has no ASCII letters to keep.
        assert_eq!(social_username_base(&profile(Some("สมชาย"))), "fb_10223344");
    }

    #[test]
    fn test_social_username_is_bounded() {
        let long = "a".repeat(80);
        let name = social_username_base(&profile(Some(&long)));
        assert_eq!(name.len(), SOCIAL_USERNAME_BASE_LEN);
        assert!(validate::username(&name).is_ok());
    }
}
