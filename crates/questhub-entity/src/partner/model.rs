//! Partner entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::review::ReviewStatus;

/// A referral agent who onboards shops, riders and attractions in a province
/// and earns commission on shop fees.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Partner {
    /// Partner id.
    pub id: Uuid,
    /// Owning account.
    pub user_id: Uuid,
    /// Legal name.
    pub full_name: String,
    /// Contact phone.
    pub phone: String,
    /// Province the partner works in (canonical name).
    pub province: String,
    /// Bank used for commission payouts.
    pub bank_name: Option<String>,
    /// Account holder name.
    pub bank_account_name: Option<String>,
    /// Account number.
    pub bank_account_number: Option<String>,
    /// Code shops and riders quote when they sign up; issued on approval.
    pub referral_code: Option<String>,
    /// Review status.
    pub status: ReviewStatus,
    /// Commission rate in basis points.
    pub commission_bps: i32,
    /// Partner is skipped by assignment until this instant.
    pub cooldown_until: Option<DateTime<Utc>>,
    /// Last time a shop request was assigned to this partner.
    pub last_assigned_at: Option<DateTime<Utc>>,
    /// Admin who last reviewed the application.
    pub reviewed_by: Option<Uuid>,
    /// When the application was last reviewed.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reason given on rejection or suspension.
    pub rejection_reason: Option<String>,
    /// When the application was submitted.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Partner {
    /// Approved partners are eligible for assignment and referrals.
    pub fn is_approved(&self) -> bool {
        self.status == ReviewStatus::Approved
    }

    /// Whether the assignment cooldown has elapsed at `now`.
    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        self.cooldown_until.is_none_or(|until| until <= now)
    }
}

/// Data required to file a partner application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePartner {
    /// Applying account.
    pub user_id: Uuid,
    /// Legal name.
    pub full_name: String,
    /// Contact phone.
    pub phone: String,
    /// Canonical province name.
    pub province: String,
    /// Bank name.
    pub bank_name: Option<String>,
    /// Account holder name.
    pub bank_account_name: Option<String>,
    /// Account number.
    pub bank_account_number: Option<String>,
}
