//! Review workflow status shared by partners, riders and attractions.

use serde::{Deserialize, Serialize};

use crate::macros::db_enum_strings;

/// Where an application or submission stands in admin review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "review_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    /// Waiting for an admin decision.
    Pending,
    /// Accepted by an admin.
    Approved,
    /// Declined by an admin, with a reason.
    Rejected,
    /// Previously approved, then withdrawn.
    Suspended,
}

db_enum_strings!(ReviewStatus, "review status", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Suspended => "suspended",
});

impl ReviewStatus {
    /// Whether an admin may approve from this status.
    pub fn can_approve(&self) -> bool {
        matches!(self, Self::Pending | Self::Rejected | Self::Suspended)
    }

    /// Whether an admin may reject from this status.
    pub fn can_reject(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether an admin may suspend from this status.
    pub fn can_suspend(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        assert!(ReviewStatus::Pending.can_approve());
        assert!(ReviewStatus::Pending.can_reject());
        assert!(!ReviewStatus::Approved.can_approve());
        assert!(!ReviewStatus::Rejected.can_reject());
        assert!(ReviewStatus::Approved.can_suspend());
        assert!(!ReviewStatus::Pending.can_suspend());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("APPROVED".parse::<ReviewStatus>().unwrap(), ReviewStatus::Approved);
        let err = "done".parse::<ReviewStatus>().unwrap_err();
        assert!(err.message.contains("pending, approved, rejected, suspended"));
    }
}
