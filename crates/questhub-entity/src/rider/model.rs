//! Rider entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::macros::db_enum_strings;
use crate::review::ReviewStatus;

/// Vehicle a rider delivers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vehicle_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    /// Motorcycle.
    Motorcycle,
    /// Car.
    Car,
    /// Bicycle.
    Bicycle,
}

db_enum_strings!(VehicleType, "vehicle type", {
    Motorcycle => "motorcycle",
    Car => "car",
    Bicycle => "bicycle",
});

impl VehicleType {
    /// Motor vehicles must declare a licence plate.
    pub fn requires_plate(&self) -> bool {
        matches!(self, Self::Motorcycle | Self::Car)
    }
}

/// A rider application and profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rider {
    /// Rider id.
    pub id: Uuid,
    /// Owning account.
    pub user_id: Uuid,
    /// Referring partner.
    pub partner_id: Option<Uuid>,
    /// Legal name.
    pub full_name: String,
    /// Contact phone.
    pub phone: String,
    /// Canonical province name.
    pub province: String,
    /// Vehicle type.
    pub vehicle_type: VehicleType,
    /// Licence plate.
    pub license_plate: Option<String>,
    /// Storage key of the ID card photo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_card_image_key: Option<String>,
    /// Review status.
    pub status: ReviewStatus,
    /// Admin who last reviewed the application.
    pub reviewed_by: Option<Uuid>,
    /// When it was last reviewed.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reason given on rejection or suspension.
    pub rejection_reason: Option<String>,
    /// When the application was submitted.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to file a rider application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRider {
    /// Applying account.
    pub user_id: Uuid,
    /// Referring partner.
    pub partner_id: Option<Uuid>,
    /// Legal name.
    pub full_name: String,
    /// Phone.
    pub phone: String,
    /// Canonical province name.
    pub province: String,
    /// Vehicle.
    pub vehicle_type: VehicleType,
    /// Plate.
    pub license_plate: Option<String>,
    /// ID card photo key.
    pub id_card_image_key: Option<String>,
}
