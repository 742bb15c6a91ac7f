//! User self-service operations: profile, password and points.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use questhub_auth::jwt::JwtDecoder;
use questhub_auth::password::{PasswordHasher, PasswordValidator};
use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_database::repositories::{PointRepository, UserRepository};
use questhub_entity::user::{PointTransaction, User};

use crate::context::RequestContext;
use crate::validate;

/// Handles user self-service operations.
#[derive(Debug, Clone)]
pub struct UserService {
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Point ledger repository.
    point_repo: Arc<PointRepository>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Password validator.
    validator: Arc<PasswordValidator>,
    /// Token revocation after a password change.
    decoder: Arc<JwtDecoder>,
}

/// Data for updating a user's own profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    /// New display name (optional).
    pub display_name: Option<String>,
    /// New email (optional).
    pub email: Option<String>,
    /// New phone (optional).
    pub phone: Option<String>,
    /// New home province (optional).
    pub province: Option<String>,
}

/// Balance plus one page of the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct PointsOverview {
    /// Current balance.
    pub balance: i64,
    /// Ledger entries, newest first.
    pub transactions: PageResponse<PointTransaction>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        point_repo: Arc<PointRepository>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        decoder: Arc<JwtDecoder>,
    ) -> Self {
        Self {
            user_repo,
            point_repo,
            hasher,
            validator,
            decoder,
        }
    }

    /// Gets the current user's full profile.
    pub async fn get_profile(&self, ctx: &RequestContext) -> AppResult<User> {
        self.user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Updates the current user's profile fields.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        req: UpdateProfileRequest,
    ) -> AppResult<User> {
        let display_name =
            validate::optional_text("display_name", req.display_name.as_deref(), 100)?;
        let email = validate::optional_email(req.email.as_deref())?;
        let phone = match req.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => Some(validate::phone(p)?),
            None => None,
        };
        let province = validate::optional_province(req.province.as_deref())?;

        if let Some(email) = email.as_deref() {
            if let Some(existing) = self.user_repo.find_by_email(email).await? {
                if existing.id != ctx.user_id {
                    return Err(AppError::conflict("Email is already in use"));
                }
            }
        }

        let user = self
            .user_repo
            .update_profile(
                ctx.user_id,
                email.as_deref(),
                phone.as_deref(),
                display_name.as_deref(),
                province.as_deref(),
            )
            .await?;

        info!(user_id = %ctx.user_id, "Profile updated");
        Ok(user)
    }

    /// Changes the current user's password and revokes outstanding tokens.
    ///
    /// Facebook-only accounts may set a first password without supplying a
    /// current one.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        current_password: Option<&str>,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.get_profile(ctx).await?;

        if let Some(hash) = user.password_hash.clone() {
            let current = current_password.unwrap_or_default();
            let valid = self
                .hasher
                .verify_password_blocking(current.to_string(), hash)
                .await?;
            if !valid {
                return Err(AppError::authentication("Current password is incorrect"));
            }
            self.validator.validate_not_same(current, new_password)?;
        }

        let mut inputs = vec![user.username.as_str()];
        if let Some(email) = user.email.as_deref() {
            inputs.push(email);
        }
        self.validator.validate(new_password, &inputs)?;

        let new_hash = self
            .hasher
            .hash_password_blocking(new_password.to_string())
            .await?;
        self.user_repo.update_password(ctx.user_id, &new_hash).await?;
        self.decoder.revoke_user_tokens(ctx.user_id).await?;

        info!(user_id = %ctx.user_id, "Password changed");
        Ok(())
    }

    /// Point balance and ledger for the current user.
    pub async fn points(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PointsOverview> {
        let user = self.get_profile(ctx).await?;
        let transactions = self.point_repo.list_for_user(ctx.user_id, &page).await?;
        Ok(PointsOverview {
            balance: user.points_balance,
            transactions,
        })
    }
}
