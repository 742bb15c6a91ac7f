//! Shop entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::ShopStatus;

/// A merchant registered in the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Shop {
    /// Shop id.
    pub id: Uuid,
    /// Owning account.
    pub owner_id: Uuid,
    /// Referring partner, earns commission on this shop's fees.
    pub partner_id: Option<Uuid>,
    /// Shop name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Category such as `cafe` or `restaurant`.
    pub category: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Canonical province name.
    pub province: String,
    /// Latitude in degrees.
    pub latitude: Option<f64>,
    /// Longitude in degrees.
    pub longitude: Option<f64>,
    /// Storage keys of the shop's images.
    pub image_keys: Vec<String>,
    /// Lifecycle status.
    pub status: ShopStatus,
    /// Admin who last reviewed the shop.
    pub reviewed_by: Option<Uuid>,
    /// When the shop was last reviewed.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reason given on rejection or suspension.
    pub rejection_reason: Option<String>,
    /// When the shop was registered.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Shop {
    /// Active shops are visible to everyone.
    pub fn is_active(&self) -> bool {
        self.status == ShopStatus::Active
    }
}

/// Data required to register a shop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShop {
    /// Owning account.
    pub owner_id: Uuid,
    /// Referring partner resolved from a referral code.
    pub partner_id: Option<Uuid>,
    /// Shop name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Category.
    pub category: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Canonical province name.
    pub province: String,
    /// Latitude.
    pub latitude: Option<f64>,
    /// Longitude.
    pub longitude: Option<f64>,
    /// Image storage keys.
    pub image_keys: Vec<String>,
}

/// Editable shop fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateShop {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New phone.
    pub phone: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// New province.
    pub province: Option<String>,
    /// New latitude.
    pub latitude: Option<f64>,
    /// New longitude.
    pub longitude: Option<f64>,
    /// Replacement image list.
    pub image_keys: Option<Vec<String>>,
}
