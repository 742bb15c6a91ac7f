//! Rider lifecycle.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use questhub_auth::rbac::{Permission, RbacEnforcer};
use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::pagination::{PageRequest, PageResponse};
use questhub_database::repositories::rider::{RiderFilter, RiderProfileUpdate};
use questhub_database::repositories::{MediaRepository, PartnerRepository, RiderRepository};
use questhub_entity::ReviewStatus;
use questhub_entity::rider::{CreateRider, Rider, VehicleType};
use questhub_entity::user::UserRole;

use crate::context::RequestContext;
use crate::partner::service::resolve_referral;
use crate::validate;

/// A rider application as submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderApplication {
    /// Legal name.
    pub full_name: String,
    /// Contact phone.
    pub phone: String,
    /// Province to ride in.
    pub province: String,
    /// Vehicle.
    pub vehicle_type: VehicleType,
    /// Plate, required for motor vehicles.
    pub license_plate: Option<String>,
    /// Key of an uploaded ID card photo.
    pub id_card_image_key: Option<String>,
    /// Code of the referring partner.
    pub referral_code: Option<String>,
}

/// Editable rider fields; `None` keeps the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiderUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub province: Option<String>,
    pub vehicle_type: Option<VehicleType>,
    pub license_plate: Option<String>,
    pub id_card_image_key: Option<String>,
}

/// Rider applications and review.
#[derive(Debug, Clone)]
pub struct RiderService {
    rider_repo: Arc<RiderRepository>,
    partner_repo: Arc<PartnerRepository>,
    media_repo: Arc<MediaRepository>,
    rbac: Arc<RbacEnforcer>,
}

impl RiderService {
    /// Creates a new rider service.
    pub fn new(
        rider_repo: Arc<RiderRepository>,
        partner_repo: Arc<PartnerRepository>,
        media_repo: Arc<MediaRepository>,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            rider_repo,
            partner_repo,
            media_repo,
            rbac,
        }
    }

    /// File a rider application for the caller.
    pub async fn apply(&self, ctx: &RequestContext, req: RiderApplication) -> AppResult<Rider> {
        self.rbac.require_permission(ctx.role, Permission::RiderApply)?;
        if ctx.role != UserRole::User {
            return Err(AppError::authorization(
                "Only consumer accounts can apply to become a rider",
            ));
        }

        let partner = resolve_referral(&self.partner_repo, req.referral_code.as_deref()).await?;
        let license_plate = plate(req.vehicle_type, req.license_plate.as_deref())?;
        let id_card_image_key = self
            .owned_key(ctx.user_id, req.id_card_image_key)
            .await?;

        let data = CreateRider {
            user_id: ctx.user_id,
            partner_id: partner.map(|p| p.id),
            full_name: validate::text("full_name", &req.full_name, 2, 200)?,
            phone: validate::phone(&req.phone)?,
            province: validate::province(&req.province)?,
            vehicle_type: req.vehicle_type,
            license_plate,
            id_card_image_key,
        };
        let rider = self.rider_repo.create(&data).await?;
        info!(
            rider_id = %rider.id,
            user_id = %ctx.user_id,
            vehicle = %rider.vehicle_type,
            "Rider application filed"
        );
        Ok(rider)
    }

    /// The caller's rider application.
    pub async fn get_own(&self, ctx: &RequestContext) -> AppResult<Rider> {
        self.rider_repo
            .find_by_user_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("You have not applied to become a rider"))
    }

    /// Edit the caller's application; a rejected one goes back to review.
    pub async fn update_own(&self, ctx: &RequestContext, req: RiderUpdate) -> AppResult<Rider> {
        let rider = self.get_own(ctx).await?;

        let vehicle_type = req.vehicle_type.unwrap_or(rider.vehicle_type);
        let license_plate = match req.license_plate.as_deref() {
            Some(p) => plate(vehicle_type, Some(p))?,
            None => {
                plate(vehicle_type, rider.license_plate.as_deref())?;
                None
            }
        };

        let update = RiderProfileUpdate {
            full_name: match req.full_name.as_deref() {
                Some(name) => Some(validate::text("full_name", name, 2, 200)?),
                None => None,
            },
            phone: match req.phone.as_deref() {
                Some(phone) => Some(validate::phone(phone)?),
                None => None,
            },
            province: validate::optional_province(req.province.as_deref())?,
            vehicle_type: req.vehicle_type,
            license_plate,
            id_card_image_key: self.owned_key(ctx.user_id, req.id_card_image_key).await?,
        };

        let resubmit = rider.status == ReviewStatus::Rejected;
        let updated = self.rider_repo.update(rider.id, &update, resubmit).await?;
        info!(rider_id = %rider.id, resubmitted = resubmit, "Rider profile updated");
        Ok(updated)
    }

    /// List riders (admin).
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: RiderFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<Rider>> {
        self.rbac.require_permission(ctx.role, Permission::RiderReview)?;
        self.rider_repo.list(&filter, &page).await
    }

    /// Approve an application and promote the owner to rider.
    pub async fn approve(&self, ctx: &RequestContext, rider_id: Uuid) -> AppResult<Rider> {
        self.rbac.require_permission(ctx.role, Permission::RiderReview)?;
        let rider = self.find(rider_id).await?;
        if !rider.status.can_approve() {
            return Err(AppError::conflict(format!("Rider is already {}", rider.status)));
        }
        let rider = self
            .rider_repo
            .approve(rider_id, rider.status, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::conflict("Rider status changed, reload and retry"))?;
        info!(admin_id = %ctx.user_id, rider_id = %rider_id, "Rider approved");
        Ok(rider)
    }

    /// Reject a pending application.
    pub async fn reject(
        &self,
        ctx: &RequestContext,
        rider_id: Uuid,
        reason: &str,
    ) -> AppResult<Rider> {
        self.rbac.require_permission(ctx.role, Permission::RiderReview)?;
        let reason = validate::reason(reason)?;
        let rider = self.find(rider_id).await?;
        if !rider.status.can_reject() {
            return Err(AppError::conflict(format!(
                "Only pending applications can be rejected; this one is {}",
                rider.status
            )));
        }
        let rider = self
            .rider_repo
            .reject(rider_id, rider.status, ctx.user_id, &reason)
            .await?
            .ok_or_else(|| AppError::conflict("Rider status changed, reload and retry"))?;
        info!(admin_id = %ctx.user_id, rider_id = %rider_id, "Rider rejected");
        Ok(rider)
    }

    /// Suspend an approved rider and demote the owner.
    pub async fn suspend(
        &self,
        ctx: &RequestContext,
        rider_id: Uuid,
        reason: &str,
    ) -> AppResult<Rider> {
        self.rbac.require_permission(ctx.role, Permission::RiderReview)?;
        let reason = validate::reason(reason)?;
        let rider = self.find(rider_id).await?;
        if !rider.status.can_suspend() {
            return Err(AppError::conflict(format!(
                "Only approved riders can be suspended; this one is {}",
                rider.status
            )));
        }
        let rider = self
            .rider_repo
            .suspend(rider_id, ctx.user_id, &reason)
            .await?
            .ok_or_else(|| AppError::conflict("Rider status changed, reload and retry"))?;
        info!(admin_id = %ctx.user_id, rider_id = %rider_id, "Rider suspended");
        Ok(rider)
    }

    async fn owned_key(&self, owner: Uuid, key: Option<String>) -> AppResult<Option<String>> {
        match validate::trimmed(key) {
            Some(key) => {
                validate::keys_owned(&self.media_repo, owner, std::slice::from_ref(&key)).await?;
                Ok(Some(key))
            }
            None => Ok(None),
        }
    }

    async fn find(&self, rider_id: Uuid) -> AppResult<Rider> {
        self.rider_repo
            .find_by_id(rider_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Rider {rider_id} not found")))
    }
}

/// Normalise a licence plate, requiring one for motor vehicles.
fn plate(vehicle: VehicleType, value: Option<&str>) -> AppResult<Option<String>> {
    let plate = value
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty());
    match plate {
        None if vehicle.requires_plate() => Err(AppError::validation(format!(
            "license_plate is required for a {vehicle}"
        ))),
        Some(p) if p.chars().count() > 20 => {
            Err(AppError::validation("license_plate must be at most 20 characters"))
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plate_required_for_motor_vehicles() {
        assert!(plate(VehicleType::Motorcycle, None).is_err());
        assert!(plate(VehicleType::Car, Some("   ")).is_err());
        assert_eq!(plate(VehicleType::Bicycle, None).unwrap(), None);
    }

    #[test]
    fn test_plate_whitespace_collapsed() {
        assert_eq!(
            plate(VehicleType::Car, Some("  1กข   1234  ")).unwrap(),
            Some("1กข 1234".to_string())
        );
        assert!(plate(VehicleType::Car, Some(&"X".repeat(21))).is_err());
    }
}
