//! RBAC enforcement: checks whether a role holds a required permission.

use questhub_core::error::AppError;
use questhub_entity::user::UserRole;

use super::policies::{Permission, RbacPolicies};

/// Enforces role-based access control.
#[derive(Debug, Clone, Default)]
pub struct RbacEnforcer {
    /// The policy configuration.
    policies: RbacPolicies,
}

impl RbacEnforcer {
    /// Creates a new enforcer with the default policy set.
    pub fn new() -> Self {
        Self {
            policies: RbacPolicies::new(),
        }
    }

    /// Checks whether the given role has the required permission.
    ///
    /// Returns `Ok(())` if allowed, or an authorization error if denied.
    pub fn require_permission(
        &self,
        role: UserRole,
        permission: Permission,
    ) -> Result<(), AppError> {
        if self.policies.has_permission(role, permission) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Role '{role}' does not have permission '{permission:?}'"
            )))
        }
    }

    /// Checks whether the role has the required permission (returns bool).
    pub fn has_permission(&self, role: UserRole, permission: Permission) -> bool {
        self.policies.has_permission(role, permission)
    }

    /// Requires the admin role.
    pub fn require_admin(&self, role: UserRole) -> Result<(), AppError> {
        if role.is_admin() {
            Ok(())
        } else {
            Err(AppError::authorization("Administrator access required"))
        }
    }

    /// Returns a reference to the underlying policies.
    pub fn policies(&self) -> &RbacPolicies {
        &self.policies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questhub_core::error::ErrorKind;

    #[test]
    fn test_denied_permission_is_authorization_error() {
        let rbac = RbacEnforcer::new();
        let err = rbac
            .require_permission(UserRole::Rider, Permission::FeeSplitManage)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert!(rbac.require_permission(UserRole::Admin, Permission::FeeSplitManage).is_ok());
    }

    #[test]
    fn test_require_admin() {
        let rbac = RbacEnforcer::new();
        assert!(rbac.require_admin(UserRole::Admin).is_ok());
        assert!(rbac.require_admin(UserRole::Partner).is_err());
    }
}
