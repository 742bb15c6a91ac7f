//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use questhub_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Built by the API extractor from a validated access token and passed into
/// service methods so that every operation knows who is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The user's role at the time the JWT was issued.
    pub role: UserRole,
    /// The username (convenience field from JWT claims).
    pub username: String,
    /// IP address of the request origin.
    pub ip_address: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: Uuid, role: UserRole, username: String, ip_address: String) -> Self {
        Self {
            user_id,
            role,
            username,
            ip_address,
            request_time: Utc::now(),
        }
    }

    /// Admin context for operator commands run outside HTTP.
    pub fn system() -> Self {
        Self::new(Uuid::nil(), UserRole::Admin, "system".to_string(), "local".to_string())
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether the caller is `user_id` or an admin.
    pub fn is_self_or_admin(&self, user_id: Uuid) -> bool {
        self.user_id == user_id || self.is_admin()
    }
}
