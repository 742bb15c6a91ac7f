//! Points crediting on submission approval and login lockout against
//! PostgreSQL.

mod database;

use chrono::{Duration, Utc};
use uuid::Uuid;

use questhub_core::error::ErrorKind;
use questhub_database::repositories::submission::QUEST_REWARD_REASON;
use questhub_database::repositories::{QuestRepository, SubmissionRepository, UserRepository};
use questhub_entity::quest::{
    CreateQuest, CreateSubmission, Quest, QuestStatus, QuestSubmission, QuestType,
    SubmissionStatus,
};
use questhub_entity::user::UserRole;

use database::TestDatabase;

const REWARD: i64 = 150;

async fn active_quest(db: &TestDatabase, creator: Uuid, max_completions: Option<i32>) -> Quest {
    QuestRepository::new(db.pool.clone())
        .create(&CreateQuest {
            shop_id: None,
            title: "Share Songkran at the old town".to_string(),
            description: "Post a photo from the festival".to_string(),
            quest_type: QuestType::SocialPost,
            reward_points: REWARD,
            province: Some("Chiang Mai".to_string()),
            latitude: None,
            longitude: None,
            radius_meters: None,
            starts_at: None,
            ends_at: None,
            max_completions,
            status: QuestStatus::Active,
            created_by: creator,
        })
        .await
        .expect("Failed to create quest")
}

async fn submit(db: &TestDatabase, quest_id: Uuid, user_id: Uuid) -> QuestSubmission {
    SubmissionRepository::new(db.pool.clone())
        .create(&CreateSubmission {
            quest_id,
            user_id,
            proof_url: Some("https://facebook.com/posts/1".to_string()),
            image_keys: Vec::new(),
            latitude: None,
            longitude: None,
            note: None,
        })
        .await
        .expect("Failed to create submission")
}

async fn ledger_total(db: &TestDatabase, user_id: Uuid) -> (i64, i64) {
    sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(delta), 0)::BIGINT FROM point_transactions \
         WHERE user_id = $1 AND reason = $2",
    )
    .bind(user_id)
    .bind(QUEST_REWARD_REASON)
    .fetch_one(&db.pool)
    .await
    .expect("Failed to read ledger")
}

#[tokio::test]
async fn test_approval_credits_points_and_ledger_once() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let admin = db.user(UserRole::Admin).await;
    let player = db.user(UserRole::User).await;
    let quest = active_quest(&db, admin.id, None).await;
    let submission = submit(&db, quest.id, player.id).await;
    let repo = SubmissionRepository::new(db.pool.clone());

    let approved = repo.approve(submission.id, admin.id).await.unwrap();
    assert_eq!(approved.status, SubmissionStatus::Approved);
    assert_eq!(approved.points_awarded, REWARD);
    assert_eq!(approved.reviewed_by, Some(admin.id));

    assert_eq!(db.reload_user(player.id).await.points_balance, REWARD);
    assert_eq!(ledger_total(&db, player.id).await, (1, REWARD));
    let quest = QuestRepository::new(db.pool.clone())
        .find_by_id(quest.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(quest.completion_count, 1);

    let again = repo.approve(submission.id, admin.id).await.unwrap_err();
    assert_eq!(again.kind, ErrorKind::Conflict);
    assert_eq!(db.reload_user(player.id).await.points_balance, REWARD);
    assert_eq!(ledger_total(&db, player.id).await, (1, REWARD));

    // One live submission per user and quest.
    let duplicate = SubmissionRepository::new(db.pool.clone())
        .create(&CreateSubmission {
            quest_id: quest.id,
            user_id: player.id,
            proof_url: Some("https://facebook.com/posts/2".to_string()),
            image_keys: Vec::new(),
            latitude: None,
            longitude: None,
            note: None,
        })
        .await
        .unwrap_err();
    assert_eq!(duplicate.kind, ErrorKind::Conflict);

    db.cleanup().await;
}

#[tokio::test]
async fn test_capacity_limit_refuses_later_approvals() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let admin = db.user(UserRole::Admin).await;
    let early = db.user(UserRole::User).await;
    let late = db.user(UserRole::User).await;
    let quest = active_quest(&db, admin.id, Some(1)).await;
    let first = submit(&db, quest.id, early.id).await;
    let second = submit(&db, quest.id, late.id).await;
    let repo = SubmissionRepository::new(db.pool.clone());

    repo.approve(first.id, admin.id).await.unwrap();
    let err = repo.approve(second.id, admin.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let second = repo.find_by_id(second.id).await.unwrap().unwrap();
    assert_eq!(second.status, SubmissionStatus::Pending);
    assert_eq!(db.reload_user(late.id).await.points_balance, 0);
    assert_eq!(ledger_total(&db, late.id).await, (0, 0));

    let quest = QuestRepository::new(db.pool.clone())
        .find_by_id(quest.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(quest.completion_count, 1);
    assert!(quest.is_full());

    db.cleanup().await;
}

#[tokio::test]
async fn test_failed_logins_lock_after_the_limit() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let user = db.user(UserRole::User).await;
    let repo = UserRepository::new(db.pool.clone());

    assert_eq!(repo.record_failed_login(user.id, 3, 15).await.unwrap(), None);
    assert_eq!(repo.record_failed_login(user.id, 3, 15).await.unwrap(), None);
    let stored = db.reload_user(user.id).await;
    assert_eq!(stored.failed_login_attempts, 2);
    assert!(!stored.is_locked());

    let until = repo
        .record_failed_login(user.id, 3, 15)
        .await
        .unwrap()
        .expect("third failure locks the account");
    assert!(until > Utc::now() + Duration::minutes(14));
    assert!(until <= Utc::now() + Duration::minutes(16));

    let stored = db.reload_user(user.id).await;
    assert!(stored.is_locked());
    assert_eq!(stored.failed_login_attempts, 0);

    repo.record_successful_login(user.id).await.unwrap();
    let stored = db.reload_user(user.id).await;
    assert!(!stored.is_locked());
    assert_eq!(stored.locked_until, None);
    assert!(stored.last_login_at.is_some());

    db.cleanup().await;
}
