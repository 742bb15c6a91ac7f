//! Pure checks on quest definitions and submission proofs.

use chrono::{DateTime, Utc};

use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::geo::{GeoPoint, point_from};
use questhub_entity::quest::{Quest, QuestStatus, QuestType};

/// Smallest check-in radius in metres.
pub const MIN_RADIUS_M: i32 = 10;
/// Largest check-in radius in metres.
pub const MAX_RADIUS_M: i32 = 5_000;

/// The fields of a quest that rules apply to, after edits are merged.
#[derive(Debug, Clone, Copy)]
pub struct QuestShape {
    pub quest_type: QuestType,
    pub reward_points: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub max_completions: Option<i32>,
}

impl QuestShape {
    /// The stored shape of a quest.
    pub fn of(quest: &Quest) -> Self {
        Self {
            quest_type: quest.quest_type,
            reward_points: quest.reward_points,
            latitude: quest.latitude,
            longitude: quest.longitude,
            radius_meters: quest.radius_meters,
            starts_at: quest.starts_at,
            ends_at: quest.ends_at,
            max_completions: quest.max_completions,
        }
    }
}

/// Validate a quest definition against the reward ceiling.
pub fn check_quest(shape: &QuestShape, max_reward_points: i64) -> AppResult<()> {
    if !(1..=max_reward_points).contains(&shape.reward_points) {
        return Err(AppError::validation(format!(
            "reward_points must be between 1 and {max_reward_points}"
        )));
    }
    if let (Some(starts), Some(ends)) = (shape.starts_at, shape.ends_at) {
        if starts >= ends {
            return Err(AppError::validation("starts_at must be before ends_at"));
        }
    }
    if shape.max_completions.is_some_and(|max| max < 1) {
        return Err(AppError::validation("max_completions must be at least 1"));
    }
    if let Some(radius) = shape.radius_meters {
        if !(MIN_RADIUS_M..=MAX_RADIUS_M).contains(&radius) {
            return Err(AppError::validation(format!(
                "radius_meters must be between {MIN_RADIUS_M} and {MAX_RADIUS_M}"
            )));
        }
    }
    if shape.quest_type == QuestType::CheckIn {
        if point_from(shape.latitude, shape.longitude).is_none() {
            return Err(AppError::validation(
                "Check-in quests need a latitude and longitude",
            ));
        }
        if shape.radius_meters.is_none() {
            return Err(AppError::validation("Check-in quests need radius_meters"));
        }
    }
    Ok(())
}

/// The proof a user attached to a submission.
#[derive(Debug, Clone, Copy)]
pub struct Proof<'a> {
    pub proof_url: Option<&'a str>,
    pub image_count: usize,
    pub location: Option<GeoPoint>,
}

/// Check that the proof fits the quest type.
pub fn check_proof(quest: &Quest, proof: &Proof<'_>) -> AppResult<()> {
    match quest.quest_type {
        QuestType::SocialPost => {
            if proof.proof_url.is_none() {
                return Err(AppError::validation(
                    "Social post quests need a proof_url linking to the post",
                ));
            }
        }
        QuestType::ContentCreation => {
            if proof.proof_url.is_none() && proof.image_count == 0 {
                return Err(AppError::validation(
                    "Content quests need a proof_url or at least one image",
                ));
            }
        }
        QuestType::CheckIn => {
            let Some(at) = proof.location else {
                return Err(AppError::validation(
                    "Check-in submissions need latitude and longitude",
                ));
            };
            let (Some(target), Some(radius)) =
                (point_from(quest.latitude, quest.longitude), quest.radius_meters)
            else {
                return Err(AppError::internal("Check-in quest has no location"));
            };
            let distance = target.distance_m(&at);
            if distance > f64::from(radius) {
                return Err(AppError::validation(format!(
                    "You are {distance:.0} m from the check-in point; it must be within {radius} m"
                )));
            }
        }
    }
    Ok(())
}

/// Check that `quest` takes new submissions at `now`, naming the reason
/// when it does not.
pub fn check_open(quest: &Quest, now: DateTime<Utc>) -> AppResult<()> {
    if quest.accepts_submissions(now) {
        return Ok(());
    }
    if quest.status != QuestStatus::Active {
        return Err(AppError::conflict(format!("Quest is {}", quest.status)));
    }
    if !quest.is_within_window(now) {
        return Err(AppError::conflict("Quest is outside its submission window"));
    }
    Err(AppError::conflict("Quest has reached its completion limit"))
}

/// Whoever runs a quest (its creator or the owner of its shop) cannot
/// complete it. Admins are exempt.
pub fn check_submitter(manages_quest: bool, is_admin: bool) -> AppResult<()> {
    if manages_quest && !is_admin {
        return Err(AppError::authorization("You cannot submit to your own quest"));
    }
    Ok(())
}

/// Accept only absolute http(s) links.
pub fn proof_url(value: Option<&str>) -> AppResult<Option<String>> {
    let Some(url) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let has_scheme = url.starts_with("https://") || url.starts_with("http://");
    if !has_scheme || url.len() > 2000 || url.chars().any(char::is_whitespace) {
        return Err(AppError::validation("proof_url must be an http(s) link"));
    }
    Ok(Some(url.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use questhub_core::error::ErrorKind;

    use super::*;

    fn shape(quest_type: QuestType) -> QuestShape {
        QuestShape {
            quest_type,
            reward_points: 100,
            latitude: None,
            longitude: None,
            radius_meters: None,
            starts_at: None,
            ends_at: None,
            max_completions: None,
        }
    }

    fn check_in_quest() -> Quest {
        let now = Utc::now();
        Quest {
            id: Uuid::now_v7(),
            shop_id: None,
            title: "Wat Phra Singh".to_string(),
            description: "Check in at the temple gate".to_string(),
            quest_type: QuestType::CheckIn,
            reward_points: 30,
            province: Some("Chiang Mai".to_string()),
            latitude: Some(18.7884),
            longitude: Some(98.9817),
            radius_meters: Some(100),
            starts_at: None,
            ends_at: None,
            max_completions: None,
            completion_count: 0,
            status: QuestStatus::Active,
            created_by: Uuid::now_v7(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_reward_bounds() {
        let mut s = shape(QuestType::SocialPost);
        assert!(check_quest(&s, 1_000).is_ok());
        s.reward_points = 0;
        assert!(check_quest(&s, 1_000).is_err());
        s.reward_points = 1_001;
        assert!(check_quest(&s, 1_000).is_err());
    }

    #[test]
    fn test_window_order() {
        let now = Utc::now();
        let mut s = shape(QuestType::SocialPost);
        s.starts_at = Some(now);
        s.ends_at = Some(now);
        assert!(check_quest(&s, 1_000).is_err());
        s.ends_at = Some(now + Duration::days(1));
        assert!(check_quest(&s, 1_000).is_ok());
    }

    #[test]
    fn test_check_in_needs_location_and_radius() {
        let mut s = shape(QuestType::CheckIn);
        assert!(check_quest(&s, 1_000).is_err());
        s.latitude = Some(13.7563);
        s.longitude = Some(100.5018);
        assert!(check_quest(&s, 1_000).is_err());
        s.radius_meters = Some(5);
        assert!(check_quest(&s, 1_000).is_err());
        s.radius_meters = Some(250);
        assert!(check_quest(&s, 1_000).is_ok());
        s.radius_meters = Some(5_001);
        assert!(check_quest(&s, 1_000).is_err());
    }

    #[test]
    fn test_check_in_distance() {
        let quest = check_in_quest();
        let near = Proof {
            proof_url: None,
            image_count: 0,
            location: GeoPoint::new(18.7889, 98.9819),
        };
        assert!(check_proof(&quest, &near).is_ok());

        // About 1.1 km north.
        let far = Proof {
            location: GeoPoint::new(18.7984, 98.9817),
            ..near
        };
        let err = check_proof(&quest, &far).unwrap_err();
        assert!(err.message.contains("within 100 m"));

        let nowhere = Proof { location: None, ..near };
        assert!(check_proof(&quest, &nowhere).is_err());
    }

    #[test]
    fn test_proof_by_type() {
        let mut quest = check_in_quest();
        let empty = Proof {
            proof_url: None,
            image_count: 0,
            location: None,
        };
        quest.quest_type = QuestType::SocialPost;
        assert!(check_proof(&quest, &empty).is_err());
        let linked = Proof {
            proof_url: Some("https://fb.com/p/1"),
            ..empty
        };
        assert!(check_proof(&quest, &linked).is_ok());
        assert!(check_proof(&quest, &Proof { image_count: 2, ..empty }).is_err());

        quest.quest_type = QuestType::ContentCreation;
        assert!(check_proof(&quest, &empty).is_err());
        assert!(check_proof(&quest, &Proof { image_count: 1, ..empty }).is_ok());
    }

    #[test]
    fn test_proof_url_shape() {
        assert_eq!(proof_url(Some("  ")).unwrap(), None);
        assert!(proof_url(Some("https://www.instagram.com/p/abc")).unwrap().is_some());
        assert!(proof_url(Some("ftp://example.com")).is_err());
        assert!(proof_url(Some("javascript:alert(1)")).is_err());
        assert!(proof_url(Some("https://a b")).is_err());
    }

    #[test]
    fn test_open_quest_reasons() {
        let now = Utc::now();
        let mut quest = check_in_quest();
        assert!(check_open(&quest, now).is_ok());

        quest.status = QuestStatus::Draft;
        let err = check_open(&quest, now).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(err.message.contains("draft"));

        quest.status = QuestStatus::Active;
        quest.ends_at = Some(now - Duration::minutes(1));
        let err = check_open(&quest, now).unwrap_err();
        assert!(err.message.contains("window"));

        quest.ends_at = None;
        quest.max_completions = Some(2);
        quest.completion_count = 2;
        let err = check_open(&quest, now).unwrap_err();
        assert!(err.message.contains("limit"));
    }

    #[test]
    fn test_quest_managers_cannot_submit() {
        let err = check_submitter(true, false).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert!(check_submitter(true, true).is_ok());
        assert!(check_submitter(false, false).is_ok());
    }
}
