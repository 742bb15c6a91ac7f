//! Shop signup request repository, including the atomic partner assignment.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_entity::partner::Partner;
use questhub_entity::shop_request::{
    AssignmentDecision, AssignmentGuard, CreateShopRequest, ShopRequest, ShopRequestStatus,
};

use super::shop::ShopRepository;
use super::{db_error, like_pattern};

/// Filters for request listings.
#[derive(Debug, Clone, Default)]
pub struct ShopRequestFilter {
    /// Only requests in this status.
    pub status: Option<ShopRequestStatus>,
    /// Only requests in this province.
    pub province: Option<String>,
    /// Only requests held by this partner.
    pub assigned_partner_id: Option<Uuid>,
    /// Substring of shop name, contact name or phone.
    pub search: Option<String>,
}

/// What an assignment pass did.
#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    /// The request after the pass.
    pub request: ShopRequest,
    /// The partner now holding it, with its new cooldown; `None` when no
    /// approved partner exists and the request is left pending.
    pub partner: Option<Partner>,
}

/// Repository for shop signup requests.
#[derive(Debug, Clone)]
pub struct ShopRequestRepository {
    pool: PgPool,
}

impl ShopRequestRepository {
    /// Create a new shop request repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a request by id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ShopRequest>> {
        sqlx::query_as::<_, ShopRequest>("SELECT * FROM shop_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find shop request"))
    }

    /// Store a new request in `pending` status.
    pub async fn create(&self, data: &CreateShopRequest) -> AppResult<ShopRequest> {
        sqlx::query_as::<_, ShopRequest>(
            "INSERT INTO shop_requests (id, shop_name, contact_name, phone, province, details, \
             requested_by) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.shop_name)
        .bind(&data.contact_name)
        .bind(&data.phone)
        .bind(&data.province)
        .bind(&data.details)
        .bind(data.requested_by)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create shop request"))
    }

    /// List requests with optional filters, newest first.
    pub async fn list(
        &self,
        filter: &ShopRequestFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ShopRequest>> {
        let pattern = like_pattern(filter.search.as_deref());
        const WHERE: &str = "WHERE ($1::shop_request_status IS NULL OR status = $1) \
             AND ($2::text IS NULL OR province = $2) \
             AND ($3::uuid IS NULL OR assigned_partner_id = $3) \
             AND ($4::text IS NULL OR shop_name ILIKE $4 OR contact_name ILIKE $4 OR phone ILIKE $4)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM shop_requests {WHERE}"))
            .bind(filter.status)
            .bind(&filter.province)
            .bind(filter.assigned_partner_id)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count shop requests"))?;

        let items = sqlx::query_as::<_, ShopRequest>(&format!(
            "SELECT * FROM shop_requests {WHERE} ORDER BY created_at DESC LIMIT $5 OFFSET $6"
        ))
        .bind(filter.status)
        .bind(&filter.province)
        .bind(filter.assigned_partner_id)
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list shop requests"))?;

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }

    /// Pick a partner for a request and persist the choice in a single
    /// transaction.
    ///
    /// The request row and every approved partner row are locked
    /// `FOR UPDATE` (partners in id order) before `select` runs, so
    /// concurrent passes serialize and a partner's cooldown is never read
    /// stale. `guard` is checked against the locked row and a request that
    /// has moved on since the caller read it is refused with a conflict.
    /// `select` receives the locked request, all approved partners and the
    /// current time.
    pub async fn assign_with<F>(
        &self,
        request_id: Uuid,
        guard: AssignmentGuard,
        cooldown: Duration,
        select: F,
    ) -> AppResult<AssignmentOutcome>
    where
        F: FnOnce(&ShopRequest, &[Partner], DateTime<Utc>) -> Option<AssignmentDecision> + Send,
    {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let request = sqlx::query_as::<_, ShopRequest>(
            "SELECT * FROM shop_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock shop request"))?
        .ok_or_else(|| AppError::not_found(format!("Shop request {request_id} not found")))?;

        if !guard.admits(&request) {
            return Err(AppError::conflict(format!(
                "Shop request is {} and no longer in a state to be assigned",
                request.status
            )));
        }

        let partners = sqlx::query_as::<_, Partner>(
            "SELECT * FROM partners WHERE status = 'approved' ORDER BY id FOR UPDATE",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to lock partners"))?;

        let now = Utc::now();
        let Some(decision) = select(&request, &partners, now) else {
            let request = sqlx::query_as::<_, ShopRequest>(
                "UPDATE shop_requests SET status = 'pending', assigned_partner_id = NULL, \
                 assigned_at = NULL, updated_at = NOW() WHERE id = $1 RETURNING *",
            )
            .bind(request_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to release shop request"))?;
            tx.commit().await.map_err(db_error("Failed to commit assignment"))?;
            return Ok(AssignmentOutcome {
                request,
                partner: None,
            });
        };

        let mut tried = if decision.new_round {
            Vec::new()
        } else {
            request.tried_partner_ids.clone()
        };
        if !tried.contains(&decision.partner_id) {
            tried.push(decision.partner_id);
        }

        let request = sqlx::query_as::<_, ShopRequest>(
            "UPDATE shop_requests SET status = 'assigned', assigned_partner_id = $2, \
             assigned_at = $3, assignment_count = assignment_count + 1, tried_partner_ids = $4, \
             updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(request_id)
        .bind(decision.partner_id)
        .bind(now)
        .bind(&tried)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to assign shop request"))?;

        let partner = sqlx::query_as::<_, Partner>(
            "UPDATE partners SET cooldown_until = $2, last_assigned_at = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(decision.partner_id)
        .bind(now + cooldown)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to start partner cooldown"))?;

        tx.commit().await.map_err(db_error("Failed to commit assignment"))?;
        Ok(AssignmentOutcome {
            request,
            partner: Some(partner),
        })
    }

    /// Mark an assigned request as accepted by its holder.
    pub async fn accept(&self, id: Uuid, partner_id: Uuid) -> AppResult<Option<ShopRequest>> {
        sqlx::query_as::<_, ShopRequest>(
            "UPDATE shop_requests SET status = 'accepted', updated_at = NOW() \
             WHERE id = $1 AND assigned_partner_id = $2 AND status = 'assigned' RETURNING *",
        )
        .bind(id)
        .bind(partner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to accept shop request"))
    }

    /// Close an accepted request with the shop it produced, crediting the
    /// shop to the partner if it has no referrer yet.
    pub async fn complete(
        &self,
        id: Uuid,
        partner_id: Uuid,
        shop_id: Uuid,
    ) -> AppResult<Option<ShopRequest>> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let request = sqlx::query_as::<_, ShopRequest>(
            "UPDATE shop_requests SET status = 'completed', shop_id = $3, updated_at = NOW() \
             WHERE id = $1 AND assigned_partner_id = $2 AND status = 'accepted' RETURNING *",
        )
        .bind(id)
        .bind(partner_id)
        .bind(shop_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to complete shop request"))?;

        let Some(request) = request else {
            return Ok(None);
        };

        ShopRepository::set_partner_if_empty(&mut tx, shop_id, partner_id).await?;
        tx.commit().await.map_err(db_error("Failed to commit completion"))?;
        Ok(Some(request))
    }

    /// Cancel a request that has not reached a terminal state.
    pub async fn cancel(&self, id: Uuid) -> AppResult<Option<ShopRequest>> {
        sqlx::query_as::<_, ShopRequest>(
            "UPDATE shop_requests SET status = 'cancelled', updated_at = NOW() \
             WHERE id = $1 AND status NOT IN ('completed', 'cancelled') RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to cancel shop request"))
    }

    /// Requests still `assigned` and assigned before `cutoff`.
    pub async fn find_stale_assigned(
        &self,
        cutoff: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar(
            "SELECT id FROM shop_requests WHERE status = 'assigned' AND assigned_at < $1 \
             ORDER BY assigned_at LIMIT $2",
        )
        .bind(cutoff)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to find stale assignments"))
    }

    /// Requests waiting for a partner, oldest first.
    pub async fn find_unassigned(&self, limit: i64) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar(
            "SELECT id FROM shop_requests WHERE status = 'pending' ORDER BY created_at LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to find unassigned requests"))
    }
}
