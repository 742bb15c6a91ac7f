//! Shop fee split records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::macros::db_enum_strings;

/// What the shop paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "fee_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FeeType {
    /// One-off registration fee charged on approval.
    Registration,
    /// Recurring subscription.
    Subscription,
    /// Paid promotion or featured placement.
    Promotion,
    /// Anything else.
    Other,
}

db_enum_strings!(FeeType, "fee type", {
    Registration => "registration",
    Subscription => "subscription",
    Promotion => "promotion",
    Other => "other",
});

/// Immutable record of how one shop fee was divided between the platform
/// and the referring partner. Amounts are satang.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShopFeeSplitRecord {
    /// Record id.
    pub id: Uuid,
    /// Shop that paid.
    pub shop_id: Uuid,
    /// Partner credited, if the shop was referred.
    pub partner_id: Option<Uuid>,
    /// What the fee was for.
    pub fee_type: FeeType,
    /// Total charged.
    pub gross_amount: i64,
    /// Platform share.
    pub platform_amount: i64,
    /// Partner share.
    pub partner_amount: i64,
    /// Rate applied, in basis points.
    pub commission_bps: i32,
    /// Free-form note.
    pub note: Option<String>,
    /// Admin who recorded the fee.
    pub recorded_by: Uuid,
    /// When it was recorded.
    pub created_at: DateTime<Utc>,
}

/// Data required to write a fee split record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeeSplit {
    /// Shop.
    pub shop_id: Uuid,
    /// Partner.
    pub partner_id: Option<Uuid>,
    /// Fee type.
    pub fee_type: FeeType,
    /// Gross.
    pub gross_amount: i64,
    /// Platform share.
    pub platform_amount: i64,
    /// Partner share.
    pub partner_amount: i64,
    /// Rate.
    pub commission_bps: i32,
    /// Note.
    pub note: Option<String>,
    /// Recorder.
    pub recorded_by: Uuid,
}

/// Aggregated totals over a set of records.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct FeeSplitSummary {
    /// Number of records.
    pub record_count: i64,
    /// Sum of gross amounts.
    pub gross_total: i64,
    /// Sum of platform shares.
    pub platform_total: i64,
    /// Sum of partner shares.
    pub partner_total: i64,
}
