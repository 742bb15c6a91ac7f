//! Shop lifecycle status.

use serde::{Deserialize, Serialize};

use crate::macros::db_enum_strings;

/// Whether a shop is visible in the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "shop_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShopStatus {
    /// Registered, waiting for admin approval.
    Pending,
    /// Approved and publicly listed.
    Active,
    /// Declined by an admin.
    Rejected,
    /// Taken down by an admin.
    Suspended,
}

db_enum_strings!(ShopStatus, "shop status", {
    Pending => "pending",
    Active => "active",
    Rejected => "rejected",
    Suspended => "suspended",
});

impl ShopStatus {
    /// Whether an admin may approve from this status.
    pub fn can_approve(&self) -> bool {
        matches!(self, Self::Pending | Self::Rejected | Self::Suspended)
    }
}
