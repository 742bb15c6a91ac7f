//! Admin user management: listing, role and status changes.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use questhub_auth::jwt::JwtDecoder;
use questhub_auth::password::{PasswordHasher, PasswordValidator};
use questhub_auth::rbac::{Permission, RbacEnforcer};
use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_database::repositories::UserRepository;
use questhub_database::repositories::user::UserFilter;
use questhub_entity::user::{CreateUser, User, UserRole, UserStatus};

use crate::context::RequestContext;
use crate::validate;

/// Handles administrative user management operations.
#[derive(Debug, Clone)]
pub struct AdminUserService {
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Password validator.
    validator: Arc<PasswordValidator>,
    /// Token revocation on role or status changes.
    decoder: Arc<JwtDecoder>,
    /// RBAC enforcer.
    rbac: Arc<RbacEnforcer>,
}

impl AdminUserService {
    /// Creates a new admin user service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        decoder: Arc<JwtDecoder>,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            validator,
            decoder,
            rbac,
        }
    }

    /// Lists users with optional role, status and search filters.
    pub async fn list_users(
        &self,
        ctx: &RequestContext,
        filter: UserFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<User>> {
        self.rbac.require_permission(ctx.role, Permission::UserManage)?;
        self.user_repo.list(&filter, &page).await
    }

    /// Gets a single user.
    pub async fn get_user(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<User> {
        self.rbac.require_permission(ctx.role, Permission::UserManage)?;
        self.find(user_id).await
    }

    /// Changes a user's role. Outstanding tokens are revoked so the new
    /// role applies on the next sign-in.
    pub async fn change_role(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        role: UserRole,
    ) -> AppResult<User> {
        self.rbac.require_permission(ctx.role, Permission::UserManage)?;
        if user_id == ctx.user_id && role != UserRole::Admin {
            return Err(AppError::validation("You cannot remove your own admin role"));
        }
        let current = self.find(user_id).await?;
        if current.role == role {
            return Ok(current);
        }
        if current.role == UserRole::Admin {
            self.ensure_other_admin_remains().await?;
        }

        let user = self.user_repo.update_role(user_id, role).await?;
        self.decoder.revoke_user_tokens(user_id).await?;
        info!(
            admin_id = %ctx.user_id,
            user_id = %user_id,
            from = %current.role,
            to = %role,
            "User role changed"
        );
        Ok(user)
    }

    /// Changes a user's status. Deactivating or locking revokes tokens.
    pub async fn change_status(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        status: UserStatus,
    ) -> AppResult<User> {
        self.rbac.require_permission(ctx.role, Permission::UserManage)?;
        if user_id == ctx.user_id && status != UserStatus::Active {
            return Err(AppError::validation("You cannot deactivate your own account"));
        }
        self.find(user_id).await?;

        let user = self.user_repo.update_status(user_id, status).await?;
        if !status.can_login() {
            self.decoder.revoke_user_tokens(user_id).await?;
        }
        info!(admin_id = %ctx.user_id, user_id = %user_id, status = %status, "User status changed");
        Ok(user)
    }

    /// Create an admin account. Used by the CLI to bootstrap a deployment,
    /// so it takes no request context.
    pub async fn create_admin(
        &self,
        username: &str,
        email: Option<&str>,
        password: &str,
    ) -> AppResult<User> {
        let username = validate::username(username)?;
        let email = validate::optional_email(email)?;
        self.validator.validate(password, &[username.as_str()])?;
        if self.user_repo.username_exists(&username).await? {
            return Err(AppError::conflict(format!(
                "Username '{username}' is already taken"
            )));
        }

        let password_hash = self.hasher.hash_password_blocking(password.to_string()).await?;
        let user = self
            .user_repo
            .create(&CreateUser {
                username,
                email,
                phone: None,
                password_hash: Some(password_hash),
                facebook_id: None,
                display_name: None,
                province: None,
                role: UserRole::Admin,
            })
            .await?;
        info!(user_id = %user.id, username = %user.username, "Admin account created");
        Ok(user)
    }

    /// Enable or disable an account without a request context (CLI).
    pub async fn set_status_unchecked(&self, user_id: Uuid, status: UserStatus) -> AppResult<User> {
        let user = self.user_repo.update_status(user_id, status).await?;
        if !status.can_login() {
            self.decoder.revoke_user_tokens(user_id).await?;
        }
        Ok(user)
    }

    async fn find(&self, user_id: Uuid) -> AppResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    async fn ensure_other_admin_remains(&self) -> AppResult<()> {
        if self.user_repo.count_by_role(UserRole::Admin).await? <= 1 {
            return Err(AppError::conflict("Cannot demote the last admin"));
        }
        Ok(())
    }
}
