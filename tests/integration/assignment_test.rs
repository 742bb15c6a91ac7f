//! Shop request assignment against PostgreSQL: locking, state guards,
//! cooldowns and round resets.

mod database;

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use questhub_auth::rbac::RbacEnforcer;
use questhub_core::config::MarketplaceConfig;
use questhub_core::error::ErrorKind;
use questhub_database::repositories::{PartnerRepository, ShopRepository, ShopRequestRepository};
use questhub_entity::partner::Partner;
use questhub_entity::shop_request::{
    AssignmentGuard, CreateShopRequest, ShopRequest, ShopRequestStatus,
};
use questhub_entity::user::UserRole;
use questhub_service::ShopRequestService;
use questhub_service::partner::select_partner;

use database::TestDatabase;

const COOLDOWN_HOURS: i64 = 4;

async fn pending_request(db: &TestDatabase, province: &str) -> ShopRequest {
    ShopRequestRepository::new(db.pool.clone())
        .create(&CreateShopRequest {
            shop_name: "Baan Kafe".to_string(),
            contact_name: "Malee".to_string(),
            phone: "0898765432".to_string(),
            province: province.to_string(),
            details: None,
            requested_by: None,
        })
        .await
        .expect("Failed to create shop request")
}

fn first(_: usize) -> usize {
    0
}

#[tokio::test]
async fn test_concurrent_sweeps_assign_a_request_once() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let admin = db.user(UserRole::Admin).await;
    let mut partners = Vec::new();
    for _ in 0..3 {
        partners.push(db.approved_partner("Chiang Mai", admin.id).await);
    }
    let request = pending_request(&db, "Chiang Mai").await;

    let service = ShopRequestService::new(
        Arc::new(ShopRequestRepository::new(db.pool.clone())),
        Arc::new(PartnerRepository::new(db.pool.clone())),
        Arc::new(ShopRepository::new(db.pool.clone())),
        Arc::new(RbacEnforcer::new()),
        &MarketplaceConfig::default(),
    );

    let (a, b) = tokio::join!(service.sweep(), service.sweep());
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.assigned + b.assigned, 1);
    assert_eq!(a.failed + b.failed, 0);

    let stored = ShopRequestRepository::new(db.pool.clone())
        .find_by_id(request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ShopRequestStatus::Assigned);
    assert_eq!(stored.assignment_count, 1);
    assert_eq!(stored.tried_partner_ids.len(), 1);

    let mut cooling = 0;
    for p in &partners {
        if db.partner(p.id).await.cooldown_until.is_some() {
            cooling += 1;
        }
    }
    assert_eq!(cooling, 1, "only the holder starts a cooldown");

    db.cleanup().await;
}

#[tokio::test]
async fn test_racing_first_assignments_leave_one_holder() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let admin = db.user(UserRole::Admin).await;
    db.approved_partner("Phuket", admin.id).await;
    db.approved_partner("Phuket", admin.id).await;
    let request = pending_request(&db, "Phuket").await;
    let repo = ShopRequestRepository::new(db.pool.clone());
    let cooldown = Duration::hours(COOLDOWN_HOURS);

    let select = |r: &ShopRequest, p: &[Partner], now| select_partner(r, p, now, first);
    let (a, b) = tokio::join!(
        repo.assign_with(request.id, AssignmentGuard::Unassigned, cooldown, select),
        repo.assign_with(request.id, AssignmentGuard::Unassigned, cooldown, select),
    );

    let (won, lost) = match (a, b) {
        (Ok(won), Err(lost)) | (Err(lost), Ok(won)) => (won, lost),
        (a, b) => panic!("expected exactly one winner, got {a:?} and {b:?}"),
    };
    assert_eq!(lost.kind, ErrorKind::Conflict);
    assert_eq!(won.request.assignment_count, 1);

    let stored = repo.find_by_id(request.id).await.unwrap().unwrap();
    assert_eq!(stored.assigned_partner_id, won.partner.map(|p| p.id));

    db.cleanup().await;
}

#[tokio::test]
async fn test_assignment_round_cooldown_and_release() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let admin = db.user(UserRole::Admin).await;
    db.approved_partner("Nan", admin.id).await;
    db.approved_partner("Nan", admin.id).await;
    let request = pending_request(&db, "Nan").await;
    let repo = ShopRequestRepository::new(db.pool.clone());
    let cooldown = Duration::hours(COOLDOWN_HOURS);
    let select = |r: &ShopRequest, p: &[Partner], now| select_partner(r, p, now, first);

    // First pick starts a round and the holder's cooldown.
    let first_pass = repo
        .assign_with(request.id, AssignmentGuard::Unassigned, cooldown, select)
        .await
        .unwrap();
    let x = first_pass.partner.expect("a partner is available");
    let assigned_at = first_pass.request.assigned_at.expect("assigned_at is set");
    assert_eq!(first_pass.request.status, ShopRequestStatus::Assigned);
    assert_eq!(first_pass.request.assignment_count, 1);
    assert_eq!(first_pass.request.tried_partner_ids, vec![x.id]);
    let until = x.cooldown_until.expect("cooldown started");
    assert!((until - assigned_at - cooldown).num_seconds().abs() <= 1);
    assert_eq!(x.last_assigned_at, Some(assigned_at));

    // The holder declines; the other partner is next in the same round.
    let second = repo
        .assign_with(request.id, AssignmentGuard::HeldBy(x.id), cooldown, select)
        .await
        .unwrap();
    let y = second.partner.expect("a partner is available");
    assert_ne!(y.id, x.id);
    assert_eq!(second.request.assignment_count, 2);
    assert_eq!(second.request.tried_partner_ids, vec![x.id, y.id]);

    // A decline from the previous holder no longer applies.
    let stale = repo
        .assign_with(request.id, AssignmentGuard::HeldBy(x.id), cooldown, select)
        .await
        .unwrap_err();
    assert_eq!(stale.kind, ErrorKind::Conflict);

    // Everyone has been tried: a new round starts without the releasing partner.
    let third = repo
        .assign_with(request.id, AssignmentGuard::HeldBy(y.id), cooldown, select)
        .await
        .unwrap();
    assert_eq!(third.partner.map(|p| p.id), Some(x.id));
    assert_eq!(third.request.assignment_count, 3);
    assert_eq!(third.request.tried_partner_ids, vec![x.id]);

    // Nobody to hand it to: the request goes back to pending.
    let released = repo
        .assign_with(request.id, AssignmentGuard::HeldBy(x.id), cooldown, |_, _, _| None)
        .await
        .unwrap();
    assert!(released.partner.is_none());
    assert_eq!(released.request.status, ShopRequestStatus::Pending);
    assert_eq!(released.request.assigned_partner_id, None);
    assert_eq!(released.request.assigned_at, None);
    assert_eq!(released.request.assignment_count, 3);

    db.cleanup().await;
}

#[tokio::test]
async fn test_timeout_guard_spares_fresh_and_accepted_requests() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let admin = db.user(UserRole::Admin).await;
    db.approved_partner("Krabi", admin.id).await;
    db.approved_partner("Krabi", admin.id).await;
    let request = pending_request(&db, "Krabi").await;
    let repo = ShopRequestRepository::new(db.pool.clone());
    let cooldown = Duration::hours(COOLDOWN_HOURS);
    let select = |r: &ShopRequest, p: &[Partner], now| select_partner(r, p, now, first);

    let outcome = repo
        .assign_with(request.id, AssignmentGuard::Unassigned, cooldown, select)
        .await
        .unwrap();
    let holder = outcome.partner.expect("a partner is available").id;

    let cutoff = Utc::now() - Duration::hours(24);
    let err = repo
        .assign_with(request.id, AssignmentGuard::TimedOut(cutoff), cooldown, select)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    repo.accept(request.id, holder).await.unwrap().expect("holder accepts");
    sqlx::query("UPDATE shop_requests SET assigned_at = NOW() - INTERVAL '2 days' WHERE id = $1")
        .bind(request.id)
        .execute(&db.pool)
        .await
        .unwrap();

    let err = repo
        .assign_with(request.id, AssignmentGuard::TimedOut(cutoff), cooldown, select)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let stored = repo.find_by_id(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ShopRequestStatus::Accepted);
    assert_eq!(stored.assigned_partner_id, Some(holder));
    assert_eq!(stored.assignment_count, 1);

    // An admin override still moves it.
    let moved = repo
        .assign_with(request.id, AssignmentGuard::Open, cooldown, select)
        .await
        .unwrap();
    assert_ne!(moved.partner.map(|p| p.id), Some(holder));
    assert_eq!(moved.request.status, ShopRequestStatus::Assigned);

    db.cleanup().await;
}

#[tokio::test]
async fn test_unknown_request_is_not_found() {
    let Some(db) = TestDatabase::connect().await else {
        return;
    };
    let repo = ShopRequestRepository::new(db.pool.clone());
    let err = repo
        .assign_with(Uuid::new_v4(), AssignmentGuard::Open, Duration::hours(1), |_, _, _| None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    db.cleanup().await;
}
