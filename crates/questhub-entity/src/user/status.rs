//! User account status enumeration.

use serde::{Deserialize, Serialize};

use crate::macros::db_enum_strings;

/// Account status for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Account is active and can log in.
    Active,
    /// Account is deactivated by an admin.
    Inactive,
    /// Account is locked by an admin.
    Locked,
}

db_enum_strings!(UserStatus, "user status", {
    Active => "active",
    Inactive => "inactive",
    Locked => "locked",
});

impl UserStatus {
    /// Check if the user can log in with this status.
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }
}
