//! Quest submission model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::macros::db_enum_strings;

/// Review state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "submission_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Waiting for the shop or an admin.
    Pending,
    /// Accepted; points were credited.
    Approved,
    /// Declined; the user may submit again.
    Rejected,
}

db_enum_strings!(SubmissionStatus, "submission status", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

/// A consumer's proof of completing a quest.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestSubmission {
    /// Submission id.
    pub id: Uuid,
    /// Quest being completed.
    pub quest_id: Uuid,
    /// Submitting account.
    pub user_id: Uuid,
    /// Link to a post or other public proof.
    pub proof_url: Option<String>,
    /// Uploaded image keys.
    pub image_keys: Vec<String>,
    /// Reported latitude for check-ins.
    pub latitude: Option<f64>,
    /// Reported longitude for check-ins.
    pub longitude: Option<f64>,
    /// Note from the user.
    pub note: Option<String>,
    /// Review status.
    pub status: SubmissionStatus,
    /// Points credited on approval.
    pub points_awarded: i64,
    /// Reviewer.
    pub reviewed_by: Option<Uuid>,
    /// Review time.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reason given on rejection.
    pub rejection_reason: Option<String>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

/// Data required to submit a quest completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubmission {
    /// Quest.
    pub quest_id: Uuid,
    /// Submitter.
    pub user_id: Uuid,
    /// Proof link.
    pub proof_url: Option<String>,
    /// Images.
    pub image_keys: Vec<String>,
    /// Latitude.
    pub latitude: Option<f64>,
    /// Longitude.
    pub longitude: Option<f64>,
    /// Note.
    pub note: Option<String>,
}
