//! Quest entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::macros::db_enum_strings;

/// What a consumer has to do to complete a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "quest_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuestType {
    /// Publish a social media post and link it.
    SocialPost,
    /// Be physically present near the quest location.
    CheckIn,
    /// Produce photos or other content.
    ContentCreation,
}

db_enum_strings!(QuestType, "quest type", {
    SocialPost => "social_post",
    CheckIn => "check_in",
    ContentCreation => "content_creation",
});

/// Quest lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "quest_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuestStatus {
    /// Being prepared, invisible to consumers.
    Draft,
    /// Open for submissions.
    Active,
    /// No longer accepting submissions.
    Closed,
}

db_enum_strings!(QuestStatus, "quest status", {
    Draft => "draft",
    Active => "active",
    Closed => "closed",
});

/// A task consumers complete for points.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quest {
    /// Quest id.
    pub id: Uuid,
    /// Sponsoring shop, absent for platform quests.
    pub shop_id: Option<Uuid>,
    /// Title.
    pub title: String,
    /// Instructions.
    pub description: String,
    /// Kind of quest.
    pub quest_type: QuestType,
    /// Points credited on approval.
    pub reward_points: i64,
    /// Province the quest belongs to.
    pub province: Option<String>,
    /// Check-in latitude.
    pub latitude: Option<f64>,
    /// Check-in longitude.
    pub longitude: Option<f64>,
    /// Check-in radius in metres.
    pub radius_meters: Option<i32>,
    /// Submissions open at.
    pub starts_at: Option<DateTime<Utc>>,
    /// Submissions close at.
    pub ends_at: Option<DateTime<Utc>>,
    /// Cap on approved completions.
    pub max_completions: Option<i32>,
    /// Approved completions so far.
    pub completion_count: i32,
    /// Lifecycle status.
    pub status: QuestStatus,
    /// Account that created the quest.
    pub created_by: Uuid,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update.
    pub updated_at: DateTime<Utc>,
}

impl Quest {
    /// Whether `now` falls inside the optional start/end window.
    pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
        let started = self.starts_at.is_none_or(|s| s <= now);
        let not_ended = self.ends_at.is_none_or(|e| now < e);
        started && not_ended
    }

    /// Whether the completion cap has been reached.
    pub fn is_full(&self) -> bool {
        self.max_completions
            .is_some_and(|max| self.completion_count >= max)
    }

    /// Whether consumers may submit at `now`.
    pub fn accepts_submissions(&self, now: DateTime<Utc>) -> bool {
        self.status == QuestStatus::Active && self.is_within_window(now) && !self.is_full()
    }
}

/// Data required to create a quest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuest {
    /// Sponsoring shop.
    pub shop_id: Option<Uuid>,
    /// Title.
    pub title: String,
    /// Instructions.
    pub description: String,
    /// Kind.
    pub quest_type: QuestType,
    /// Reward.
    pub reward_points: i64,
    /// Province.
    pub province: Option<String>,
    /// Latitude.
    pub latitude: Option<f64>,
    /// Longitude.
    pub longitude: Option<f64>,
    /// Radius.
    pub radius_meters: Option<i32>,
    /// Window start.
    pub starts_at: Option<DateTime<Utc>>,
    /// Window end.
    pub ends_at: Option<DateTime<Utc>>,
    /// Completion cap.
    pub max_completions: Option<i32>,
    /// Initial status, draft or active.
    pub status: QuestStatus,
    /// Creator.
    pub created_by: Uuid,
}

/// Editable quest fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateQuest {
    /// Title.
    pub title: Option<String>,
    /// Instructions.
    pub description: Option<String>,
    /// Reward.
    pub reward_points: Option<i64>,
    /// Province.
    pub province: Option<String>,
    /// Latitude.
    pub latitude: Option<f64>,
    /// Longitude.
    pub longitude: Option<f64>,
    /// Radius.
    pub radius_meters: Option<i32>,
    /// Window start.
    pub starts_at: Option<DateTime<Utc>>,
    /// Window end.
    pub ends_at: Option<DateTime<Utc>>,
    /// Completion cap.
    pub max_completions: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn quest() -> Quest {
        let now = Utc::now();
        Quest {
            id: Uuid::new_v4(),
            shop_id: None,
            title: "Visit Old Town".to_string(),
            description: "Check in at the clock tower".to_string(),
            quest_type: QuestType::CheckIn,
            reward_points: 50,
            province: Some("Phuket".to_string()),
            latitude: Some(7.884),
            longitude: Some(98.388),
            radius_meters: Some(200),
            starts_at: None,
            ends_at: None,
            max_completions: Some(2),
            completion_count: 0,
            status: QuestStatus::Active,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_window() {
        let now = Utc::now();
        let mut q = quest();
        assert!(q.accepts_submissions(now));
        q.starts_at = Some(now + Duration::hours(1));
        assert!(!q.accepts_submissions(now));
        q.starts_at = Some(now - Duration::hours(2));
        q.ends_at = Some(now - Duration::hours(1));
        assert!(!q.accepts_submissions(now));
    }

    #[test]
    fn test_cap_and_status() {
        let now = Utc::now();
        let mut q = quest();
        q.completion_count = 2;
        assert!(q.is_full());
        assert!(!q.accepts_submissions(now));
        q.completion_count = 0;
        q.status = QuestStatus::Draft;
        assert!(!q.accepts_submissions(now));
    }

    #[test]
    fn test_quest_type_spelling() {
        assert_eq!(QuestType::CheckIn.as_str(), "check_in");
        assert_eq!(
            serde_json::to_string(&QuestType::ContentCreation).unwrap(),
            "\"content_creation\""
        );
        assert_eq!("social_post".parse::<QuestType>().unwrap(), QuestType::SocialPost);
    }
}
