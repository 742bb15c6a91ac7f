//! Tourist attraction model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::review::ReviewStatus;

/// A point of interest shown on the consumer map once approved.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attraction {
    /// Attraction id.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Category such as `temple`, `beach` or `market`.
    pub category: String,
    /// Canonical province name.
    pub province: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Street address.
    pub address: Option<String>,
    /// Image keys.
    pub image_keys: Vec<String>,
    /// Review status (`pending`, `approved` or `rejected`).
    pub status: ReviewStatus,
    /// Account that submitted the attraction.
    pub submitted_by: Uuid,
    /// Partner profile of the submitter, when submitted by a partner.
    pub partner_id: Option<Uuid>,
    /// Reviewer.
    pub reviewed_by: Option<Uuid>,
    /// Review time.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Rejection reason.
    pub rejection_reason: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create an attraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAttraction {
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Category.
    pub category: String,
    /// Province.
    pub province: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Address.
    pub address: Option<String>,
    /// Images.
    pub image_keys: Vec<String>,
    /// Initial status.
    pub status: ReviewStatus,
    /// Submitter.
    pub submitted_by: Uuid,
    /// Submitter's partner profile.
    pub partner_id: Option<Uuid>,
}

/// Editable attraction fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAttraction {
    /// Name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Category.
    pub category: Option<String>,
    /// Province.
    pub province: Option<String>,
    /// Latitude.
    pub latitude: Option<f64>,
    /// Longitude.
    pub longitude: Option<f64>,
    /// Address.
    pub address: Option<String>,
    /// Images.
    pub image_keys: Option<Vec<String>>,
}
