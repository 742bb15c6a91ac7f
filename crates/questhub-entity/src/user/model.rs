//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;
use super::status::UserStatus;

/// A registered account. One account carries one role; partners, shop owners
/// and riders are ordinary accounts promoted by an admin approval.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Email address (optional, unique when present).
    pub email: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// Argon2 password hash. Absent for Facebook-only accounts.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// Linked Facebook user id.
    #[serde(skip_serializing)]
    pub facebook_id: Option<String>,
    /// Role used for authorization.
    pub role: UserRole,
    /// Account status.
    pub status: UserStatus,
    /// Home province (canonical name).
    pub province: Option<String>,
    /// Spendable quest points.
    pub points_balance: i64,
    /// Number of consecutive failed login attempts.
    pub failed_login_attempts: i32,
    /// Account locked until this time (if locked).
    pub locked_until: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Check if the user account is currently locked.
    pub fn is_locked(&self) -> bool {
        if self.status == UserStatus::Locked {
            return true;
        }
        if let Some(locked_until) = self.locked_until {
            return Utc::now() < locked_until;
        }
        false
    }

    /// Check if the user can log in right now.
    pub fn can_login(&self) -> bool {
        self.status.can_login() && !self.is_locked()
    }

    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether password login is possible for this account.
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Phone number (optional).
    pub phone: Option<String>,
    /// Pre-hashed password; `None` for social sign-ups.
    pub password_hash: Option<String>,
    /// Facebook user id for social sign-ups.
    pub facebook_id: Option<String>,
    /// Display name (optional).
    pub display_name: Option<String>,
    /// Home province.
    pub province: Option<String>,
    /// Assigned role.
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "somchai".to_string(),
            email: None,
            phone: None,
            display_name: None,
            password_hash: None,
            facebook_id: Some("1234".to_string()),
            role: UserRole::User,
            status: UserStatus::Active,
            province: Some("Phuket".to_string()),
            points_balance: 0,
            failed_login_attempts: 0,
            locked_until: None,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    #[test]
    fn test_lock_window() {
        let mut u = user();
        assert!(u.can_login());
        u.locked_until = Some(Utc::now() + Duration::minutes(5));
        assert!(u.is_locked());
        assert!(!u.can_login());
        u.locked_until = Some(Utc::now() - Duration::minutes(5));
        assert!(u.can_login());
    }

    #[test]
    fn test_secrets_not_serialized() {
        let mut u = user();
        u.password_hash = Some("$argon2id$...".to_string());
        let json = serde_json::to_value(&u).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("facebook_id").is_none());
        assert!(!user().has_password());
    }
}
