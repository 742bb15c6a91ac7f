//! Typed path and query parameter helpers.

use std::str::FromStr;

use uuid::Uuid;

use questhub_core::error::AppError;

/// Parses a UUID from a path segment.
pub fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s).map_err(|_| AppError::validation(format!("Invalid UUID: {s}")))
}

/// Parses an optional enum filter; blank values mean "no filter".
pub fn parse_optional<T>(value: Option<&str>) -> Result<Option<T>, AppError>
where
    T: FromStr<Err = AppError>,
{
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::parse)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use questhub_entity::ReviewStatus;

    #[test]
    fn test_parse_uuid() {
        assert!(parse_uuid("not-a-uuid").is_err());
        assert!(parse_uuid("0192f0a0-0000-7000-8000-000000000000").is_ok());
    }

    #[test]
    fn test_parse_optional_filter() {
        assert_eq!(parse_optional::<ReviewStatus>(None).unwrap(), None);
        assert_eq!(parse_optional::<ReviewStatus>(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_optional::<ReviewStatus>(Some("Approved")).unwrap(),
            Some(ReviewStatus::Approved)
        );
        assert!(parse_optional::<ReviewStatus>(Some("maybe")).is_err());
    }
}
