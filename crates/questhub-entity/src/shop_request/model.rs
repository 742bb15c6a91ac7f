//! Shop signup request model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::ShopRequestStatus;

/// A prospective merchant asking to be onboarded. Requests are routed to a
/// partner who visits the shop and completes its registration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShopRequest {
    /// Request id.
    pub id: Uuid,
    /// Name of the shop to onboard.
    pub shop_name: String,
    /// Person to contact.
    pub contact_name: String,
    /// Contact phone.
    pub phone: String,
    /// Canonical province name.
    pub province: String,
    /// Free-form details from the requester.
    pub details: Option<String>,
    /// Account that submitted the request, when signed in.
    pub requested_by: Option<Uuid>,
    /// Current status.
    pub status: ShopRequestStatus,
    /// Partner currently holding the request.
    pub assigned_partner_id: Option<Uuid>,
    /// When the current partner received it.
    pub assigned_at: Option<DateTime<Utc>>,
    /// How many times the request has been assigned.
    pub assignment_count: i32,
    /// Partners already given the request in the current round.
    pub tried_partner_ids: Vec<Uuid>,
    /// Shop created from this request.
    pub shop_id: Option<Uuid>,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ShopRequest {
    /// Whether `partner_id` currently holds the request.
    pub fn is_assigned_to(&self, partner_id: Uuid) -> bool {
        self.assigned_partner_id == Some(partner_id)
    }
}

/// Data required to submit a signup request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShopRequest {
    /// Shop name.
    pub shop_name: String,
    /// Contact name.
    pub contact_name: String,
    /// Contact phone.
    pub phone: String,
    /// Canonical province name.
    pub province: String,
    /// Details.
    pub details: Option<String>,
    /// Submitting account.
    pub requested_by: Option<Uuid>,
}

/// Result of choosing a partner for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentDecision {
    /// Chosen partner.
    pub partner_id: Uuid,
    /// Every candidate had already been tried, so the tried list starts over.
    pub new_round: bool,
}

/// The state a caller expects a request to be in when it asks for a
/// (re)assignment. Checked against the locked row, so a request read before
/// the lock cannot be moved once someone else has acted on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentGuard {
    /// Still `pending`: first assignment and sweep retries.
    Unassigned,
    /// Still `assigned` and handed out before the cutoff.
    TimedOut(DateTime<Utc>),
    /// Still `assigned` to this partner, who is passing on it.
    HeldBy(Uuid),
    /// Anything not completed or cancelled (admin override).
    Open,
}

impl AssignmentGuard {
    /// Whether `request` is still in the expected state.
    pub fn admits(&self, request: &ShopRequest) -> bool {
        match *self {
            Self::Unassigned => request.status == ShopRequestStatus::Pending,
            Self::TimedOut(cutoff) => {
                request.status == ShopRequestStatus::Assigned
                    && request.assigned_at.is_some_and(|at| at < cutoff)
            }
            Self::HeldBy(partner_id) => {
                request.status == ShopRequestStatus::Assigned && request.is_assigned_to(partner_id)
            }
            Self::Open => request.status.is_assignable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(
        status: ShopRequestStatus,
        holder: Option<Uuid>,
        at: Option<DateTime<Utc>>,
    ) -> ShopRequest {
        let now = Utc::now();
        ShopRequest {
            id: Uuid::new_v4(),
            shop_name: "Baan Kafe".to_string(),
            contact_name: "Malee".to_string(),
            phone: "0898765432".to_string(),
            province: "Phuket".to_string(),
            details: None,
            requested_by: None,
            status,
            assigned_partner_id: holder,
            assigned_at: at,
            assignment_count: holder.map_or(0, |_| 1),
            tried_partner_ids: holder.into_iter().collect(),
            shop_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_unassigned_guard_rejects_a_request_that_was_picked_up() {
        let pending = request(ShopRequestStatus::Pending, None, None);
        assert!(AssignmentGuard::Unassigned.admits(&pending));

        let taken = request(ShopRequestStatus::Assigned, Some(Uuid::new_v4()), Some(Utc::now()));
        assert!(!AssignmentGuard::Unassigned.admits(&taken));
    }

    #[test]
    fn test_timed_out_guard_needs_an_old_assignment() {
        let now = Utc::now();
        let cutoff = now - Duration::hours(24);
        let partner = Some(Uuid::new_v4());

        let stale = request(ShopRequestStatus::Assigned, partner, Some(now - Duration::hours(25)));
        assert!(AssignmentGuard::TimedOut(cutoff).admits(&stale));

        let fresh = request(ShopRequestStatus::Assigned, partner, Some(now));
        assert!(!AssignmentGuard::TimedOut(cutoff).admits(&fresh));

        let accepted =
            request(ShopRequestStatus::Accepted, partner, Some(now - Duration::hours(25)));
        assert!(!AssignmentGuard::TimedOut(cutoff).admits(&accepted));
    }

    #[test]
    fn test_held_by_guard_checks_the_holder() {
        let a = Uuid::new_v4();
        let held = request(ShopRequestStatus::Assigned, Some(a), Some(Utc::now()));
        assert!(AssignmentGuard::HeldBy(a).admits(&held));
        assert!(!AssignmentGuard::HeldBy(Uuid::new_v4()).admits(&held));

        let accepted = request(ShopRequestStatus::Accepted, Some(a), Some(Utc::now()));
        assert!(!AssignmentGuard::HeldBy(a).admits(&accepted));
    }

    #[test]
    fn test_open_guard_only_refuses_terminal_requests() {
        let partner = Some(Uuid::new_v4());
        let at = Some(Utc::now());
        assert!(AssignmentGuard::Open.admits(&request(ShopRequestStatus::Pending, None, None)));
        assert!(AssignmentGuard::Open.admits(&request(ShopRequestStatus::Accepted, partner, at)));
        assert!(!AssignmentGuard::Open.admits(&request(ShopRequestStatus::Completed, partner, at)));
        assert!(!AssignmentGuard::Open.admits(&request(ShopRequestStatus::Cancelled, None, None)));
    }
}
