//! User repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_entity::user::{CreateUser, User, UserRole, UserStatus};

use super::{db_error, like_pattern, unique_violation};

/// Filters for the admin user list.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Only users with this role.
    pub role: Option<UserRole>,
    /// Only users with this status.
    pub status: Option<UserStatus>,
    /// Substring of username, display name or email.
    pub search: Option<String>,
}

/// Repository for user CRUD and query operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by id"))
    }

    /// Find a user by username (case-insensitive).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by username"))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by email"))
    }

    /// Find a user by username or email, whichever matches.
    pub async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1) \
             ORDER BY (LOWER(username) = LOWER($1)) DESC LIMIT 1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find user by login"))
    }

    /// Find the account linked to a Facebook user id.
    pub async fn find_by_facebook_id(&self, facebook_id: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE facebook_id = $1")
            .bind(facebook_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by Facebook id"))
    }

    /// Whether a username is taken (case-insensitive).
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to check username"))
    }

    /// List users with optional filters.
    pub async fn list(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        let pattern = like_pattern(filter.search.as_deref());
        const WHERE: &str = "WHERE ($1::user_role IS NULL OR role = $1) \
             AND ($2::user_status IS NULL OR status = $2) \
             AND ($3::text IS NULL OR username ILIKE $3 OR display_name ILIKE $3 OR email ILIKE $3)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users {WHERE}"))
            .bind(filter.role)
            .bind(filter.status)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count users"))?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM users {WHERE} ORDER BY created_at DESC LIMIT $4 OFFSET $5"
        ))
        .bind(filter.role)
        .bind(filter.status)
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list users"))?;

        Ok(PageResponse::new(users, page.page, page.page_size, total as u64))
    }

    /// Create a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, email, phone, password_hash, facebook_id, \
             display_name, province, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.password_hash)
        .bind(&data.facebook_id)
        .bind(&data.display_name)
        .bind(&data.province)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some("users_username_key") => {
                AppError::conflict(format!("Username '{}' already exists", data.username))
            }
            Some("users_email_key") => AppError::conflict("Email address is already registered"),
            Some("users_facebook_id_key") => {
                AppError::conflict("Facebook account is already linked")
            }
            _ => db_error("Failed to create user")(e),
        })
    }

    /// Update contact and profile fields. `None` keeps the current value.
    pub async fn update_profile(
        &self,
        id: Uuid,
        email: Option<&str>,
        phone: Option<&str>,
        display_name: Option<&str>,
        province: Option<&str>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET email = COALESCE($2, email), phone = COALESCE($3, phone), \
             display_name = COALESCE($4, display_name), province = COALESCE($5, province), \
             updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(email)
        .bind(phone)
        .bind(display_name)
        .bind(province)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some("users_email_key") => AppError::conflict("Email address is already registered"),
            _ => db_error("Failed to update user profile")(e),
        })?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// Replace the password hash.
    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to update password"))?;
        Ok(())
    }

    /// Change a user's role.
    pub async fn update_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let mut conn = self.pool.acquire().await.map_err(db_error("Failed to acquire connection"))?;
        Self::set_role(&mut conn, id, role).await
    }

    /// Change a user's role on an open connection or transaction.
    pub async fn set_role(conn: &mut PgConnection, id: Uuid, role: UserRole) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(conn)
        .await
        .map_err(db_error("Failed to update user role"))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// Promote a plain `user` account to `role`; accounts holding any other
    /// role are left unchanged.
    pub async fn promote_user(conn: &mut PgConnection, id: Uuid, role: UserRole) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 AND role = 'user'",
        )
        .bind(id)
        .bind(role)
        .execute(conn)
        .await
        .map_err(db_error("Failed to promote user"))?;
        Ok(())
    }

    /// Demote an account from `role` back to `user`, if it still holds it.
    pub async fn demote_user(conn: &mut PgConnection, id: Uuid, role: UserRole) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET role = 'user', updated_at = NOW() WHERE id = $1 AND role = $2",
        )
        .bind(id)
        .bind(role)
        .execute(conn)
        .await
        .map_err(db_error("Failed to demote user"))?;
        Ok(())
    }

    /// Change a user's account status. Reactivating clears any lockout.
    pub async fn update_status(&self, id: Uuid, status: UserStatus) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET status = $2, \
             failed_login_attempts = CASE WHEN $2 = 'active'::user_status THEN 0 ELSE failed_login_attempts END, \
             locked_until = CASE WHEN $2 = 'active'::user_status THEN NULL ELSE locked_until END, \
             updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update user status"))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// Record a failed login. When the counter reaches `max_attempts` the
    /// account is locked for `lockout_minutes` and the counter restarts.
    /// Returns the lock expiry if the account is now locked.
    pub async fn record_failed_login(
        &self,
        id: Uuid,
        max_attempts: i32,
        lockout_minutes: i32,
    ) -> AppResult<Option<DateTime<Utc>>> {
        sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            "UPDATE users SET \
             locked_until = CASE WHEN failed_login_attempts + 1 >= $2 \
                 THEN NOW() + make_interval(mins => $3) ELSE locked_until END, \
             failed_login_attempts = CASE WHEN failed_login_attempts + 1 >= $2 \
                 THEN 0 ELSE failed_login_attempts + 1 END, \
             updated_at = NOW() \
             WHERE id = $1 RETURNING locked_until",
        )
        .bind(id)
        .bind(max_attempts)
        .bind(lockout_minutes)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to record failed login"))
    }

    /// Clear the failure counter and stamp the login time.
    pub async fn record_successful_login(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET failed_login_attempts = 0, locked_until = NULL, \
             last_login_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to record login"))?;
        Ok(())
    }

    /// Link a Facebook id to an existing account.
    pub async fn link_facebook(&self, id: Uuid, facebook_id: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET facebook_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(facebook_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some("users_facebook_id_key") => {
                AppError::conflict("Facebook account is already linked to another user")
            }
            _ => db_error("Failed to link Facebook account")(e),
        })
    }

    /// Count users holding a role.
    pub async fn count_by_role(&self, role: UserRole) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count users"))
    }
}
