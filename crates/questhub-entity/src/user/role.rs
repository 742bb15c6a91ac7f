//! User role enumeration.

use serde::{Deserialize, Serialize};

use crate::macros::db_enum_strings;

/// Roles available in the RBAC system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Platform administrator.
    Admin,
    /// Approved referral agent.
    Partner,
    /// Owner of an approved shop.
    Shop,
    /// Approved rider.
    Rider,
    /// Regular consumer account.
    User,
}

db_enum_strings!(UserRole, "user role", {
    Admin => "admin",
    Partner => "partner",
    Shop => "shop",
    Rider => "rider",
    User => "user",
});

impl UserRole {
    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether an approval may promote an account holding this role.
    /// Only plain consumer accounts are promoted; admins keep their role.
    pub fn is_promotable(&self) -> bool {
        matches!(self, Self::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("PARTNER".parse::<UserRole>().unwrap(), UserRole::Partner);
        assert!("manager".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_promotable() {
        assert!(UserRole::User.is_promotable());
        assert!(!UserRole::Admin.is_promotable());
        assert!(!UserRole::Shop.is_promotable());
    }
}
