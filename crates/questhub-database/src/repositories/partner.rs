//! Partner repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_entity::partner::{CreatePartner, Partner};
use questhub_entity::review::ReviewStatus;
use questhub_entity::user::UserRole;

use super::user::UserRepository;
use super::{db_error, like_pattern, unique_violation};

/// Filters for partner listings.
#[derive(Debug, Clone, Default)]
pub struct PartnerFilter {
    /// Only partners in this review status.
    pub status: Option<ReviewStatus>,
    /// Only partners in this province.
    pub province: Option<String>,
    /// Substring of name, phone or referral code.
    pub search: Option<String>,
}

/// Bank and contact fields a partner may edit; `None` keeps the value.
#[derive(Debug, Clone, Default)]
pub struct PartnerProfileUpdate {
    /// Legal name.
    pub full_name: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Bank name.
    pub bank_name: Option<String>,
    /// Account holder.
    pub bank_account_name: Option<String>,
    /// Account number.
    pub bank_account_number: Option<String>,
}

/// Repository for partner applications and profiles.
#[derive(Debug, Clone)]
pub struct PartnerRepository {
    pool: PgPool,
}

impl PartnerRepository {
    /// Create a new partner repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a partner by id.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Partner>> {
        sqlx::query_as::<_, Partner>("SELECT * FROM partners WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find partner"))
    }

    /// Find the partner profile owned by an account.
    pub async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<Partner>> {
        sqlx::query_as::<_, Partner>("SELECT * FROM partners WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find partner by user"))
    }

    /// Find a partner by referral code (case-insensitive).
    pub async fn find_by_referral_code(&self, code: &str) -> AppResult<Option<Partner>> {
        sqlx::query_as::<_, Partner>(
            "SELECT * FROM partners WHERE UPPER(referral_code) = UPPER($1)",
        )
        .bind(code.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find partner by referral code"))
    }

    /// File a new application.
    pub async fn create(&self, data: &CreatePartner, commission_bps: i32) -> AppResult<Partner> {
        sqlx::query_as::<_, Partner>(
            "INSERT INTO partners (id, user_id, full_name, phone, province, bank_name, \
             bank_account_name, bank_account_number, commission_bps) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(data.user_id)
        .bind(&data.full_name)
        .bind(&data.phone)
        .bind(&data.province)
        .bind(&data.bank_name)
        .bind(&data.bank_account_name)
        .bind(&data.bank_account_number)
        .bind(commission_bps)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some("partners_user_id_key") => {
                AppError::conflict("A partner application already exists for this account")
            }
            _ => db_error("Failed to create partner")(e),
        })
    }

    /// Update contact and bank details.
    pub async fn update_profile(
        &self,
        id: Uuid,
        update: &PartnerProfileUpdate,
    ) -> AppResult<Partner> {
        sqlx::query_as::<_, Partner>(
            "UPDATE partners SET full_name = COALESCE($2, full_name), phone = COALESCE($3, phone), \
             bank_name = COALESCE($4, bank_name), \
             bank_account_name = COALESCE($5, bank_account_name), \
             bank_account_number = COALESCE($6, bank_account_number), \
             updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&update.full_name)
        .bind(&update.phone)
        .bind(&update.bank_name)
        .bind(&update.bank_account_name)
        .bind(&update.bank_account_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update partner"))?
        .ok_or_else(|| AppError::not_found(format!("Partner {id} not found")))
    }

    /// List partners with optional filters.
    pub async fn list(
        &self,
        filter: &PartnerFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Partner>> {
        let pattern = like_pattern(filter.search.as_deref());
        const WHERE: &str = "WHERE ($1::review_status IS NULL OR status = $1) \
             AND ($2::text IS NULL OR province = $2) \
             AND ($3::text IS NULL OR full_name ILIKE $3 OR phone ILIKE $3 OR referral_code ILIKE $3)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM partners {WHERE}"))
            .bind(filter.status)
            .bind(&filter.province)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count partners"))?;

        let items = sqlx::query_as::<_, Partner>(&format!(
            "SELECT * FROM partners {WHERE} ORDER BY created_at DESC LIMIT $4 OFFSET $5"
        ))
        .bind(filter.status)
        .bind(&filter.province)
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list partners"))?;

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }

    /// Approve an application still in `expected` status, issue its referral
    /// code and promote the owner to `partner`, atomically.
    ///
    /// Returns `Ok(None)` if the status changed since it was read.
    pub async fn approve(
        &self,
        id: Uuid,
        expected: ReviewStatus,
        reviewer: Uuid,
        referral_code: &str,
        commission_bps: i32,
    ) -> AppResult<Option<Partner>> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let partner = sqlx::query_as::<_, Partner>(
            "UPDATE partners SET status = 'approved', \
             referral_code = COALESCE(referral_code, $4), commission_bps = $5, \
             reviewed_by = $3, reviewed_at = NOW(), rejection_reason = NULL, updated_at = NOW() \
             WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(expected)
        .bind(reviewer)
        .bind(referral_code)
        .bind(commission_bps)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some("partners_referral_code_key") => {
                AppError::conflict("Referral code collision, retry approval")
            }
            _ => db_error("Failed to approve partner")(e),
        })?;

        let Some(partner) = partner else {
            return Ok(None);
        };

        UserRepository::promote_user(&mut tx, partner.user_id, UserRole::Partner).await?;
        tx.commit().await.map_err(db_error("Failed to commit partner approval"))?;
        Ok(Some(partner))
    }

    /// Reject an application still in `expected` status.
    pub async fn reject(
        &self,
        id: Uuid,
        expected: ReviewStatus,
        reviewer: Uuid,
        reason: &str,
    ) -> AppResult<Option<Partner>> {
        sqlx::query_as::<_, Partner>(
            "UPDATE partners SET status = 'rejected', reviewed_by = $3, reviewed_at = NOW(), \
             rejection_reason = $4, updated_at = NOW() WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(expected)
        .bind(reviewer)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to reject partner"))
    }

    /// Suspend an approved partner, clear its cooldown and demote the owner
    /// back to `user`, atomically.
    pub async fn suspend(
        &self,
        id: Uuid,
        reviewer: Uuid,
        reason: &str,
    ) -> AppResult<Option<Partner>> {
        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;

        let partner = sqlx::query_as::<_, Partner>(
            "UPDATE partners SET status = 'suspended', cooldown_until = NULL, reviewed_by = $2, \
             reviewed_at = NOW(), rejection_reason = $3, updated_at = NOW() \
             WHERE id = $1 AND status = 'approved' RETURNING *",
        )
        .bind(id)
        .bind(reviewer)
        .bind(reason)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to suspend partner"))?;

        let Some(partner) = partner else {
            return Ok(None);
        };

        UserRepository::demote_user(&mut tx, partner.user_id, UserRole::Partner).await?;
        tx.commit().await.map_err(db_error("Failed to commit partner suspension"))?;
        Ok(Some(partner))
    }

    /// Change the commission rate.
    pub async fn set_commission(&self, id: Uuid, commission_bps: i32) -> AppResult<Partner> {
        sqlx::query_as::<_, Partner>(
            "UPDATE partners SET commission_bps = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(commission_bps)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update commission rate"))?
        .ok_or_else(|| AppError::not_found(format!("Partner {id} not found")))
    }

    /// Count approved partners.
    pub async fn count_approved(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM partners WHERE status = 'approved'")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count partners"))
    }
}
