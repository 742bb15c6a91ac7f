//! Request DTOs with validation.
//!
//! Bodies enforce shape and length limits here; business rules (province
//! names, phone formats, ownership of image keys) are checked by the
//! services they are converted into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use questhub_database::repositories::partner::PartnerProfileUpdate;
use questhub_entity::fee_split::FeeType;
use questhub_entity::quest::QuestType;
use questhub_entity::rider::VehicleType;
use questhub_entity::user::{UserRole, UserStatus};
use questhub_service::attraction::{AttractionRequest, AttractionUpdate};
use questhub_service::auth::RegisterRequest as SvcRegister;
use questhub_service::commission::RecordFeeRequest;
use questhub_service::partner::PartnerApplication;
use questhub_service::quest::{QuestRequest, QuestUpdate, SubmissionRequest};
use questhub_service::rider::{RiderApplication, RiderUpdate};
use questhub_service::shop::{ShopRegistration, ShopUpdate};
use questhub_service::shop_request::ShopRequestSubmission;
use questhub_service::user::UpdateProfileRequest as SvcUpdateProfile;

// ── Auth ──────────────────────────────────────────────────────────

/// Registration body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub province: Option<String>,
}

impl From<RegisterRequest> for SvcRegister {
    fn from(r: RegisterRequest) -> Self {
        Self {
            username: r.username,
            email: r.email,
            password: r.password,
            display_name: r.display_name,
            phone: r.phone,
            province: r.province,
        }
    }
}

/// Login request body. `login` accepts a username or an email.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "email")]
    #[validate(length(min = 1, message = "Username or email is required"))]
    pub login: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Facebook login with a user access token from the client SDK.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FacebookLoginRequest {
    #[validate(length(min = 1, message = "access_token is required"))]
    pub access_token: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refresh_token is required"))]
    pub refresh_token: String,
}

/// Optional logout body carrying the refresh token to revoke too.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

// ── Users ─────────────────────────────────────────────────────────

/// Update profile request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub province: Option<String>,
}

impl From<UpdateProfileRequest> for SvcUpdateProfile {
    fn from(r: UpdateProfileRequest) -> Self {
        Self {
            display_name: r.display_name,
            email: r.email,
            phone: r.phone,
            province: r.province,
        }
    }
}

/// Password change request. Accounts created through Facebook have no
/// current password and may omit it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    #[validate(length(min = 1, max = 128, message = "new_password is required"))]
    pub new_password: String,
}

// ── Partners ──────────────────────────────────────────────────────

/// Partner application body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PartnerApplyRequest {
    #[validate(length(min = 2, max = 200))]
    pub full_name: String,
    #[validate(length(min = 1, max = 20))]
    pub phone: String,
    #[validate(length(min = 1, max = 100))]
    pub province: String,
    #[validate(length(max = 100))]
    pub bank_name: Option<String>,
    #[validate(length(max = 200))]
    pub bank_account_name: Option<String>,
    #[validate(length(max = 30))]
    pub bank_account_number: Option<String>,
}

impl From<PartnerApplyRequest> for PartnerApplication {
    fn from(r: PartnerApplyRequest) -> Self {
        Self {
            full_name: r.full_name,
            phone: r.phone,
            province: r.province,
            bank_name: r.bank_name,
            bank_account_name: r.bank_account_name,
            bank_account_number: r.bank_account_number,
        }
    }
}

/// Partner profile edit.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PartnerUpdateRequest {
    #[validate(length(min = 2, max = 200))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 100))]
    pub bank_name: Option<String>,
    #[validate(length(max = 200))]
    pub bank_account_name: Option<String>,
    #[validate(length(max = 30))]
    pub bank_account_number: Option<String>,
}

impl From<PartnerUpdateRequest> for PartnerProfileUpdate {
    fn from(r: PartnerUpdateRequest) -> Self {
        Self {
            full_name: r.full_name,
            phone: r.phone,
            bank_name: r.bank_name,
            bank_account_name: r.bank_account_name,
            bank_account_number: r.bank_account_number,
        }
    }
}

// ── Shop requests ─────────────────────────────────────────────────

/// Public shop signup request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitShopRequest {
    #[validate(length(min = 2, max = 200))]
    pub shop_name: String,
    #[validate(length(min = 2, max = 200))]
    pub contact_name: String,
    #[validate(length(min = 1, max = 20))]
    pub phone: String,
    #[validate(length(min = 1, max = 100))]
    pub province: String,
    #[validate(length(max = 2000))]
    pub details: Option<String>,
}

impl From<SubmitShopRequest> for ShopRequestSubmission {
    fn from(r: SubmitShopRequest) -> Self {
        Self {
            shop_name: r.shop_name,
            contact_name: r.contact_name,
            phone: r.phone,
            province: r.province,
            details: r.details,
        }
    }
}

/// Marks an accepted request as done, naming the shop it produced.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompleteShopRequest {
    pub shop_id: Uuid,
}

// ── Shops ─────────────────────────────────────────────────────────

/// Shop registration body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterShopRequest {
    #[validate(length(min = 2, max = 200))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub province: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 images"))]
    pub image_keys: Vec<String>,
    #[validate(length(max = 16))]
    pub referral_code: Option<String>,
}

impl From<RegisterShopRequest> for ShopRegistration {
    fn from(r: RegisterShopRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            category: r.category,
            phone: r.phone,
            address: r.address,
            province: r.province,
            latitude: r.latitude,
            longitude: r.longitude,
            image_keys: r.image_keys,
            referral_code: r.referral_code,
        }
    }
}

/// Shop edit; omitted fields keep their value.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateShopRequest {
    #[validate(length(min = 2, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    pub province: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(length(max = 10, message = "At most 10 images"))]
    pub image_keys: Option<Vec<String>>,
}

impl From<UpdateShopRequest> for ShopUpdate {
    fn from(r: UpdateShopRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            category: r.category,
            phone: r.phone,
            address: r.address,
            province: r.province,
            latitude: r.latitude,
            longitude: r.longitude,
            image_keys: r.image_keys,
        }
    }
}

// ── Riders ────────────────────────────────────────────────────────

/// Rider application body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RiderApplyRequest {
    #[validate(length(min = 2, max = 200))]
    pub full_name: String,
    #[validate(length(min = 1, max = 20))]
    pub phone: String,
    #[validate(length(min = 1, max = 100))]
    pub province: String,
    pub vehicle_type: VehicleType,
    pub license_plate: Option<String>,
    pub id_card_image_key: Option<String>,
    #[validate(length(max = 16))]
    pub referral_code: Option<String>,
}

impl From<RiderApplyRequest> for RiderApplication {
    fn from(r: RiderApplyRequest) -> Self {
        Self {
            full_name: r.full_name,
            phone: r.phone,
            province: r.province,
            vehicle_type: r.vehicle_type,
            license_plate: r.license_plate,
            id_card_image_key: r.id_card_image_key,
            referral_code: r.referral_code,
        }
    }
}

/// Rider profile edit.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RiderUpdateRequest {
    #[validate(length(min = 2, max = 200))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub phone: Option<String>,
    pub province: Option<String>,
    pub vehicle_type: Option<VehicleType>,
    pub license_plate: Option<String>,
    pub id_card_image_key: Option<String>,
}

impl From<RiderUpdateRequest> for RiderUpdate {
    fn from(r: RiderUpdateRequest) -> Self {
        Self {
            full_name: r.full_name,
            phone: r.phone,
            province: r.province,
            vehicle_type: r.vehicle_type,
            license_plate: r.license_plate,
            id_card_image_key: r.id_card_image_key,
        }
    }
}

// ── Quests ────────────────────────────────────────────────────────

/// New quest body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuestRequest {
    pub shop_id: Option<Uuid>,
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    pub quest_type: QuestType,
    #[validate(range(min = 1, message = "reward_points must be positive"))]
    pub reward_points: i64,
    pub province: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub radius_meters: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub max_completions: Option<i32>,
}

impl From<CreateQuestRequest> for QuestRequest {
    fn from(r: CreateQuestRequest) -> Self {
        Self {
            shop_id: r.shop_id,
            title: r.title,
            description: r.description,
            quest_type: r.quest_type,
            reward_points: r.reward_points,
            province: r.province,
            latitude: r.latitude,
            longitude: r.longitude,
            radius_meters: r.radius_meters,
            starts_at: r.starts_at,
            ends_at: r.ends_at,
            max_completions: r.max_completions,
        }
    }
}

/// Quest edit; omitted fields keep their value.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateQuestRequest {
    #[validate(length(min = 3, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "reward_points must be positive"))]
    pub reward_points: Option<i64>,
    pub province: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    pub radius_meters: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub max_completions: Option<i32>,
}

impl From<UpdateQuestRequest> for QuestUpdate {
    fn from(r: UpdateQuestRequest) -> Self {
        Self {
            title: r.title,
            description: r.description,
            reward_points: r.reward_points,
            province: r.province,
            latitude: r.latitude,
            longitude: r.longitude,
            radius_meters: r.radius_meters,
            starts_at: r.starts_at,
            ends_at: r.ends_at,
            max_completions: r.max_completions,
        }
    }
}

/// Proof of completing a quest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SubmitProofRequest {
    #[validate(url(message = "proof_url must be a URL"), length(max = 2000))]
    pub proof_url: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 images"))]
    pub image_keys: Vec<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

impl From<SubmitProofRequest> for SubmissionRequest {
    fn from(r: SubmitProofRequest) -> Self {
        Self {
            proof_url: r.proof_url,
            image_keys: r.image_keys,
            latitude: r.latitude,
            longitude: r.longitude,
            note: r.note,
        }
    }
}

// ── Attractions ───────────────────────────────────────────────────

/// New attraction body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAttractionRequest {
    #[validate(length(min = 2, max = 200))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[validate(length(min = 1, max = 100))]
    pub province: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 images"))]
    pub image_keys: Vec<String>,
}

impl From<CreateAttractionRequest> for AttractionRequest {
    fn from(r: CreateAttractionRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            category: r.category,
            province: r.province,
            latitude: r.latitude,
            longitude: r.longitude,
            address: r.address,
            image_keys: r.image_keys,
        }
    }
}

/// Attraction edit.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateAttractionRequest {
    #[validate(length(min = 2, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    pub province: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 10, message = "At most 10 images"))]
    pub image_keys: Option<Vec<String>>,
}

impl From<UpdateAttractionRequest> for AttractionUpdate {
    fn from(r: UpdateAttractionRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            category: r.category,
            province: r.province,
            latitude: r.latitude,
            longitude: r.longitude,
            address: r.address,
            image_keys: r.image_keys,
        }
    }
}

// ── Media ─────────────────────────────────────────────────────────

/// Keys to sign.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignMediaRequest {
    #[validate(length(min = 1, max = 50, message = "Between 1 and 50 keys"))]
    pub keys: Vec<String>,
}

// ── Admin ─────────────────────────────────────────────────────────

/// Reason for a rejection or suspension.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReasonRequest {
    #[validate(length(min = 1, max = 1000, message = "reason is required"))]
    pub reason: String,
}

/// Change a user's role.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangeRoleRequest {
    pub role: UserRole,
}

/// Change a user's status.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangeStatusRequest {
    pub status: UserStatus,
}

/// Optional commission override when approving a partner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ApprovePartnerRequest {
    #[validate(range(min = 0, max = 10000))]
    pub commission_bps: Option<i32>,
}

/// New commission rate in basis points.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CommissionRequest {
    #[validate(range(min = 0, max = 10000, message = "commission_bps must be 0-10000"))]
    pub commission_bps: i32,
}

/// Optional registration fee (satang) charged on shop approval.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ApproveShopRequest {
    #[validate(range(min = 0))]
    pub registration_fee: Option<i64>,
}

/// A fee to split between platform and partner.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordFeeSplitRequest {
    pub shop_id: Uuid,
    pub fee_type: FeeType,
    #[validate(range(min = 1, message = "gross_amount must be positive"))]
    pub gross_amount: i64,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

impl From<RecordFeeSplitRequest> for RecordFeeRequest {
    fn from(r: RecordFeeSplitRequest) -> Self {
        Self {
            shop_id: r.shop_id,
            fee_type: r.fee_type,
            gross_amount: r.gross_amount,
            note: r.note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_accepts_username_or_email_key() {
        let by_name: LoginRequest =
            serde_json::from_str(r#"{"username":"somchai","password":"x"}"#).unwrap();
        assert_eq!(by_name.login, "somchai");
        let by_email: LoginRequest =
            serde_json::from_str(r#"{"email":"s@example.com","password":"x"}"#).unwrap();
        assert_eq!(by_email.login, "s@example.com");
    }

    #[test]
    fn test_register_username_length() {
        let req = RegisterRequest {
            username: "ab".into(),
            email: None,
            password: "Secret123!".into(),
            display_name: None,
            phone: None,
            province: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_commission_bounds() {
        assert!(CommissionRequest { commission_bps: 10_000 }.validate().is_ok());
        assert!(CommissionRequest { commission_bps: 10_001 }.validate().is_err());
        assert!(CommissionRequest { commission_bps: -1 }.validate().is_err());
    }

    #[test]
    fn test_sign_key_limit() {
        let keys = (0..51).map(|i| format!("shop/u/{i}.jpg")).collect();
        assert!(SignMediaRequest { keys }.validate().is_err());
        assert!(SignMediaRequest { keys: vec![] }.validate().is_err());
    }

    #[test]
    fn test_proof_url_must_be_url() {
        let req = SubmitProofRequest {
            proof_url: Some("not a url".into()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
