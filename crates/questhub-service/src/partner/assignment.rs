//! Choosing a partner for a shop signup request.
//!
//! Selection is a pure function over the locked request and partner rows;
//! the repository runs it inside the assignment transaction.
//!
//! 1. Candidates are approved partners in the request's province, or every
//!    approved partner when the province has none.
//! 2. Partners already tried this round are skipped. When that leaves no
//!    one, a new round starts over the full candidate list.
//! 3. The partner releasing the request is skipped whenever someone else
//!    is left.
//! 4. A partner out of cooldown is picked uniformly at random; if all are
//!    cooling down, the one whose cooldown ends first wins (then the least
//!    recently assigned, then the lowest id).

use chrono::{DateTime, Utc};

use questhub_entity::partner::Partner;
use questhub_entity::shop_request::{AssignmentDecision, ShopRequest};

/// Pick the next partner for `request`.
///
/// `pick(n)` must return an index in `0..n`; production passes a uniform
/// random draw, tests pass something deterministic.
pub fn select_partner(
    request: &ShopRequest,
    partners: &[Partner],
    now: DateTime<Utc>,
    mut pick: impl FnMut(usize) -> usize,
) -> Option<AssignmentDecision> {
    let approved: Vec<&Partner> = partners.iter().filter(|p| p.is_approved()).collect();
    let local: Vec<&Partner> = approved
        .iter()
        .copied()
        .filter(|p| p.province.eq_ignore_ascii_case(&request.province))
        .collect();
    let pool = if local.is_empty() { approved } else { local };
    if pool.is_empty() {
        return None;
    }

    let untried: Vec<&Partner> = pool
        .iter()
        .copied()
        .filter(|p| !request.tried_partner_ids.contains(&p.id))
        .collect();
    let new_round = untried.is_empty();
    let mut candidates = if new_round { pool } else { untried };

    if let Some(releasing) = request.assigned_partner_id {
        if candidates.iter().any(|p| p.id != releasing) {
            candidates.retain(|p| p.id != releasing);
        }
    }

    let available: Vec<&Partner> = candidates
        .iter()
        .copied()
        .filter(|p| p.is_available_at(now))
        .collect();

    let chosen = if available.is_empty() {
        candidates
            .into_iter()
            .min_by_key(|p| (p.cooldown_until, p.last_assigned_at, p.id))?
    } else {
        let index = pick(available.len()).min(available.len() - 1);
        available[index]
    };

    Some(AssignmentDecision {
        partner_id: chosen.id,
        new_round,
    })
}

/// Uniform random index in `0..n`.
pub fn random_index(n: usize) -> usize {
    if n <= 1 { 0 } else { rand::random_range(0..n) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use questhub_entity::ReviewStatus;
    use questhub_entity::shop_request::ShopRequestStatus;
    use uuid::Uuid;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn partner(n: u128, province: &str) -> Partner {
        let now = Utc::now();
        Partner {
            id: id(n),
            user_id: Uuid::new_v4(),
            full_name: format!("Partner {n}"),
            phone: "0812345678".to_string(),
            province: province.to_string(),
            bank_name: None,
            bank_account_name: None,
            bank_account_number: None,
            referral_code: Some(format!("CODE{n:04}")),
            status: ReviewStatus::Approved,
            commission_bps: 1000,
            cooldown_until: None,
            last_assigned_at: None,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn request(province: &str) -> ShopRequest {
        let now = Utc::now();
        ShopRequest {
            id: Uuid::new_v4(),
            shop_name: "Baan Kafe".to_string(),
            contact_name: "Malee".to_string(),
            phone: "0898765432".to_string(),
            province: province.to_string(),
            details: None,
            requested_by: None,
            status: ShopRequestStatus::Pending,
            assigned_partner_id: None,
            assigned_at: None,
            assignment_count: 0,
            tried_partner_ids: Vec::new(),
            shop_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn first(_: usize) -> usize {
        0
    }

    #[test]
    fn test_no_partners_means_no_assignment() {
        assert_eq!(select_partner(&request("Phuket"), &[], Utc::now(), first), None);

        let mut pending = partner(1, "Phuket");
        pending.status = ReviewStatus::Pending;
        assert_eq!(select_partner(&request("Phuket"), &[pending], Utc::now(), first), None);
    }

    #[test]
    fn test_prefers_partners_in_the_same_province() {
        let partners = [partner(1, "Bangkok"), partner(2, "Phuket"), partner(3, "Bangkok")];
        for draw in 0..2 {
            let decision =
                select_partner(&request("Bangkok"), &partners, Utc::now(), |_| draw).unwrap();
            assert_ne!(decision.partner_id, id(2));
            assert!(!decision.new_round);
        }
    }

    #[test]
    fn test_falls_back_to_nationwide_pool() {
        let partners = [partner(1, "Bangkok"), partner(2, "Phuket")];
        let decision = select_partner(&request("Krabi"), &partners, Utc::now(), |n| n - 1).unwrap();
        assert_eq!(decision.partner_id, id(2));
    }

    #[test]
    fn test_random_pick_only_among_available() {
        let now = Utc::now();
        let mut cooling = partner(1, "Phuket");
        cooling.cooldown_until = Some(now + Duration::hours(3));
        let partners = [cooling, partner(2, "Phuket"), partner(3, "Phuket")];

        let mut seen = Vec::new();
        for draw in 0..2 {
            let decision = select_partner(&request("Phuket"), &partners, now, |n| {
                assert_eq!(n, 2);
                draw
            })
            .unwrap();
            seen.push(decision.partner_id);
        }
        assert_eq!(seen, vec![id(2), id(3)]);
    }

    #[test]
    fn test_expired_cooldown_counts_as_available() {
        let now = Utc::now();
        let mut a = partner(1, "Phuket");
        a.cooldown_until = Some(now - Duration::minutes(1));
        let mut b = partner(2, "Phuket");
        b.cooldown_until = Some(now + Duration::hours(1));
        let decision = select_partner(&request("Phuket"), &[a, b], now, first).unwrap();
        assert_eq!(decision.partner_id, id(1));
    }

    #[test]
    fn test_oldest_cooldown_wins_when_everyone_is_cooling() {
        let now = Utc::now();
        let mut a = partner(1, "Phuket");
        a.cooldown_until = Some(now + Duration::hours(3));
        let mut b = partner(2, "Phuket");
        b.cooldown_until = Some(now + Duration::minutes(30));
        let mut c = partner(3, "Phuket");
        c.cooldown_until = Some(now + Duration::hours(2));

        let decision = select_partner(&request("Phuket"), &[a, b, c], now, |_| {
            panic!("no random draw when nobody is available")
        })
        .unwrap();
        assert_eq!(decision.partner_id, id(2));
    }

    #[test]
    fn test_cooldown_ties_break_on_last_assignment_then_id() {
        let now = Utc::now();
        let until = Some(now + Duration::hours(1));
        let mut a = partner(1, "Phuket");
        a.cooldown_until = until;
        a.last_assigned_at = Some(now - Duration::hours(1));
        let mut b = partner(2, "Phuket");
        b.cooldown_until = until;
        b.last_assigned_at = Some(now - Duration::hours(2));
        let decision =
            select_partner(&request("Phuket"), &[a.clone(), b.clone()], now, first).unwrap();
        assert_eq!(decision.partner_id, id(2));

        b.last_assigned_at = a.last_assigned_at;
        let decision = select_partner(&request("Phuket"), &[b, a], now, first).unwrap();
        assert_eq!(decision.partner_id, id(1));
    }

    #[test]
    fn test_skips_tried_partners() {
        let mut req = request("Phuket");
        req.tried_partner_ids = vec![id(1), id(2)];
        let partners = [partner(1, "Phuket"), partner(2, "Phuket"), partner(3, "Phuket")];
        let decision = select_partner(&req, &partners, Utc::now(), first).unwrap();
        assert_eq!(decision.partner_id, id(3));
        assert!(!decision.new_round);
    }

    #[test]
    fn test_exhausted_round_starts_over_without_the_releasing_partner() {
        let mut req = request("Phuket");
        req.status = ShopRequestStatus::Assigned;
        req.assigned_partner_id = Some(id(2));
        req.tried_partner_ids = vec![id(1), id(2)];
        let partners = [partner(1, "Phuket"), partner(2, "Phuket")];

        let decision = select_partner(&req, &partners, Utc::now(), |n| n - 1).unwrap();
        assert_eq!(decision.partner_id, id(1));
        assert!(decision.new_round);
    }

    #[test]
    fn test_sole_partner_is_reassigned_to_itself() {
        let mut req = request("Phuket");
        req.assigned_partner_id = Some(id(1));
        req.tried_partner_ids = vec![id(1)];
        let decision = select_partner(&req, &[partner(1, "Phuket")], Utc::now(), first).unwrap();
        assert_eq!(decision.partner_id, id(1));
        assert!(decision.new_round);
    }

    #[test]
    fn test_out_of_range_pick_is_clamped() {
        let partners = [partner(1, "Phuket"), partner(2, "Phuket")];
        let decision = select_partner(&request("Phuket"), &partners, Utc::now(), |_| 99).unwrap();
        assert_eq!(decision.partner_id, id(2));
    }

    #[test]
    fn test_random_index_in_range() {
        assert_eq!(random_index(0), 0);
        assert_eq!(random_index(1), 0);
        for _ in 0..100 {
            assert!(random_index(3) < 3);
        }
    }
}
