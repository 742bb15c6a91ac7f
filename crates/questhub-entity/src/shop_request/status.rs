//! Shop signup request status.

use serde::{Deserialize, Serialize};

use crate::macros::db_enum_strings;

/// Progress of a signup request through partner assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "shop_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShopRequestStatus {
    /// No partner holds the request.
    Pending,
    /// A partner was picked and has not answered yet.
    Assigned,
    /// The assigned partner is onboarding the shop.
    Accepted,
    /// The shop was onboarded.
    Completed,
    /// Withdrawn by an admin.
    Cancelled,
}

db_enum_strings!(ShopRequestStatus, "shop request status", {
    Pending => "pending",
    Assigned => "assigned",
    Accepted => "accepted",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl ShopRequestStatus {
    /// Whether assignment may (re)pick a partner for the request.
    pub fn is_assignable(&self) -> bool {
        matches!(self, Self::Pending | Self::Assigned | Self::Accepted)
    }

    /// Terminal states never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_not_assignable() {
        for status in ShopRequestStatus::ALL {
            assert_ne!(status.is_assignable(), status.is_terminal());
        }
    }
}
