//! Point ledger entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One change to a user's point balance.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PointTransaction {
    /// Entry id.
    pub id: Uuid,
    /// Account whose balance changed.
    pub user_id: Uuid,
    /// Signed change in points.
    pub delta: i64,
    /// Short machine-readable reason, e.g. `quest_reward`.
    pub reason: String,
    /// Submission that earned the points, if any.
    pub submission_id: Option<Uuid>,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}
