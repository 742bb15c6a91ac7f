//! Role-to-permission mapping definitions.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use questhub_entity::user::UserRole;

/// A platform-level permission. Ownership checks (own shop, own quest,
/// assigned request) are made by the services on top of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // Accounts
    /// List and inspect any account, change role or status.
    UserManage,
    /// Apply to become a partner.
    PartnerApply,
    /// Apply to become a rider.
    RiderApply,

    // Reviews
    /// Approve, reject or suspend partners and set their commission.
    PartnerReview,
    /// Approve, reject or suspend shops.
    ShopReview,
    /// Approve, reject or suspend riders.
    RiderReview,
    /// Approve or reject tourist attractions.
    AttractionReview,

    // Shops and requests
    /// Register a shop.
    ShopRegister,
    /// Accept, decline and complete assigned shop requests.
    ShopRequestHandle,
    /// See every shop request, force reassignment, cancel.
    ShopRequestManage,

    // Commission
    /// Record fees and see every split.
    FeeSplitManage,
    /// See one's own commission records.
    CommissionViewOwn,

    // Content
    /// Submit tourist attractions.
    AttractionSubmit,
    /// Create quests.
    QuestCreate,
    /// Edit any quest and review any submission.
    QuestManageAll,
    /// Submit quest completions.
    QuestSubmit,
    /// Delete any uploaded media.
    MediaManageAll,

    // System
    /// Detailed health and operational views.
    SystemHealth,
}

/// Defines the mapping from each role to its set of allowed permissions.
#[derive(Debug, Clone)]
pub struct RbacPolicies {
    /// Role → set of permissions.
    policies: HashMap<UserRole, HashSet<Permission>>,
}

impl RbacPolicies {
    /// Creates the default policy set.
    pub fn new() -> Self {
        use Permission::*;

        let common = [ShopRegister, QuestSubmit];
        let mut policies = HashMap::new();

        // Consumers may apply for the other roles.
        policies.insert(
            UserRole::User,
            common.into_iter().chain([PartnerApply, RiderApply]).collect(),
        );

        policies.insert(
            UserRole::Partner,
            common
                .into_iter()
                .chain([ShopRequestHandle, CommissionViewOwn, AttractionSubmit])
                .collect(),
        );

        policies.insert(
            UserRole::Shop,
            common.into_iter().chain([QuestCreate]).collect(),
        );

        policies.insert(UserRole::Rider, common.into_iter().collect());

        // Admin: everything
        let admin: HashSet<Permission> = [
            UserManage,
            PartnerApply,
            RiderApply,
            PartnerReview,
            ShopReview,
            RiderReview,
            AttractionReview,
            ShopRegister,
            ShopRequestHandle,
            ShopRequestManage,
            FeeSplitManage,
            CommissionViewOwn,
            AttractionSubmit,
            QuestCreate,
            QuestManageAll,
            QuestSubmit,
            MediaManageAll,
            SystemHealth,
        ]
        .into_iter()
        .collect();
        policies.insert(UserRole::Admin, admin);

        Self { policies }
    }

    /// Returns the set of permissions for the given role.
    pub fn permissions_for_role(&self, role: UserRole) -> HashSet<Permission> {
        self.policies.get(&role).cloned().unwrap_or_default()
    }

    /// Checks whether the given role has the specified permission.
    pub fn has_permission(&self, role: UserRole, permission: Permission) -> bool {
        self.policies
            .get(&role)
            .is_some_and(|perms| perms.contains(&permission))
    }
}

impl Default for RbacPolicies {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_every_permission_of_other_roles() {
        let policies = RbacPolicies::new();
        let admin = policies.permissions_for_role(UserRole::Admin);
        for role in [UserRole::User, UserRole::Partner, UserRole::Shop, UserRole::Rider] {
            assert!(policies.permissions_for_role(role).is_subset(&admin), "{role}");
        }
    }

    #[test]
    fn test_role_specific_permissions() {
        let p = RbacPolicies::new();
        assert!(p.has_permission(UserRole::Partner, Permission::ShopRequestHandle));
        assert!(!p.has_permission(UserRole::User, Permission::ShopRequestHandle));
        assert!(p.has_permission(UserRole::Shop, Permission::QuestCreate));
        assert!(!p.has_permission(UserRole::Rider, Permission::QuestCreate));
        assert!(p.has_permission(UserRole::User, Permission::PartnerApply));
        assert!(!p.has_permission(UserRole::Partner, Permission::PartnerApply));
        assert!(!p.has_permission(UserRole::Partner, Permission::AttractionReview));
    }
}
