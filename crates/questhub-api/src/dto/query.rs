//! Query-string filters and their conversion into repository filters.
//!
//! Enum filters arrive as plain strings so a bad value is reported as a
//! validation error naming the accepted spellings.

use serde::Deserialize;
use uuid::Uuid;

use questhub_core::error::AppError;
use questhub_core::types::canonical_province;
use questhub_database::repositories::attraction::AttractionFilter;
use questhub_database::repositories::fee_split::FeeSplitFilter;
use questhub_database::repositories::partner::PartnerFilter;
use questhub_database::repositories::quest::QuestFilter;
use questhub_database::repositories::rider::RiderFilter;
use questhub_database::repositories::shop::ShopFilter;
use questhub_database::repositories::shop_request::ShopRequestFilter;
use questhub_database::repositories::user::UserFilter;

use crate::extractors::parse_optional;

fn province(value: Option<String>) -> Result<Option<String>, AppError> {
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => canonical_province(v)
            .map(|p| Some(p.to_string()))
            .ok_or_else(|| AppError::validation(format!("Unknown province: {v}"))),
    }
}

fn text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// `?role=&status=&search=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQuery {
    pub role: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl UserQuery {
    pub fn into_filter(self) -> Result<UserFilter, AppError> {
        Ok(UserFilter {
            role: parse_optional(self.role.as_deref())?,
            status: parse_optional(self.status.as_deref())?,
            search: text(self.search),
        })
    }
}

/// `?status=&province=&search=` for partner, rider and request listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewQuery {
    pub status: Option<String>,
    pub province: Option<String>,
    pub search: Option<String>,
}

impl ReviewQuery {
    pub fn into_partner_filter(self) -> Result<PartnerFilter, AppError> {
        Ok(PartnerFilter {
            status: parse_optional(self.status.as_deref())?,
            province: province(self.province)?,
            search: text(self.search),
        })
    }

    pub fn into_rider_filter(self) -> Result<RiderFilter, AppError> {
        Ok(RiderFilter {
            status: parse_optional(self.status.as_deref())?,
            province: province(self.province)?,
            partner_id: None,
            search: text(self.search),
        })
    }

    pub fn into_shop_request_filter(self) -> Result<ShopRequestFilter, AppError> {
        Ok(ShopRequestFilter {
            status: parse_optional(self.status.as_deref())?,
            province: province(self.province)?,
            assigned_partner_id: None,
            search: text(self.search),
        })
    }
}

/// `?status=` on dashboard listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

/// Shop listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShopQuery {
    pub status: Option<String>,
    pub province: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl ShopQuery {
    pub fn into_filter(self) -> Result<ShopFilter, AppError> {
        Ok(ShopFilter {
            status: parse_optional(self.status.as_deref())?,
            province: province(self.province)?,
            category: text(self.category).map(|c| c.to_lowercase()),
            owner_id: None,
            partner_id: None,
            search: text(self.search),
        })
    }
}

/// Quest listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestQuery {
    pub status: Option<String>,
    pub quest_type: Option<String>,
    pub province: Option<String>,
    pub shop_id: Option<Uuid>,
    pub search: Option<String>,
}

impl QuestQuery {
    pub fn into_filter(self) -> Result<QuestFilter, AppError> {
        Ok(QuestFilter {
            status: parse_optional(self.status.as_deref())?,
            quest_type: parse_optional(self.quest_type.as_deref())?,
            province: province(self.province)?,
            shop_id: self.shop_id,
            open_at: None,
            search: text(self.search),
        })
    }
}

/// Attraction listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttractionQuery {
    pub status: Option<String>,
    pub province: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl AttractionQuery {
    pub fn into_filter(self) -> Result<AttractionFilter, AppError> {
        Ok(AttractionFilter {
            status: parse_optional(self.status.as_deref())?,
            province: province(self.province)?,
            category: text(self.category).map(|c| c.to_lowercase()),
            submitted_by: None,
            search: text(self.search),
        })
    }
}

/// Fee split listings and summary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeeSplitQuery {
    pub shop_id: Option<Uuid>,
    pub partner_id: Option<Uuid>,
    pub fee_type: Option<String>,
}

impl FeeSplitQuery {
    pub fn into_filter(self) -> Result<FeeSplitFilter, AppError> {
        Ok(FeeSplitFilter {
            shop_id: self.shop_id,
            partner_id: self.partner_id,
            fee_type: parse_optional(self.fee_type.as_deref())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questhub_entity::quest::QuestType;
    use questhub_entity::user::UserRole;

    #[test]
    fn test_province_is_canonicalised() {
        let filter = ShopQuery {
            province: Some("chiang-mai".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.province.as_deref(), Some("Chiang Mai"));
    }

    #[test]
    fn test_unknown_province_rejected() {
        let err = ReviewQuery {
            province: Some("Atlantis".into()),
            ..Default::default()
        }
        .into_partner_filter()
        .unwrap_err();
        assert!(err.message.contains("Atlantis"));
    }

    #[test]
    fn test_enum_filters() {
        let filter = UserQuery {
            role: Some("partner".into()),
            search: Some("  ".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.role, Some(UserRole::Partner));
        assert_eq!(filter.search, None);

        let quests = QuestQuery {
            quest_type: Some("check_in".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!(quests.quest_type, Some(QuestType::CheckIn));

        assert!(
            QuestQuery {
                quest_type: Some("treasure_hunt".into()),
                ..Default::default()
            }
            .into_filter()
            .is_err()
        );
    }
}
