//! Input checks shared by the services.

use std::collections::HashSet;

use uuid::Uuid;

use questhub_core::error::AppError;
use questhub_core::result::AppResult;
use questhub_core::types::geo::GeoPoint;
use questhub_core::types::province::canonical_province;
use questhub_database::repositories::MediaRepository;

/// Trim a required text field and enforce a length range in characters.
pub fn text(field: &str, value: &str, min: usize, max: usize) -> AppResult<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min.max(1) {
        return Err(AppError::validation(format!("{field} is required")));
    }
    if len > max {
        return Err(AppError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Like [`text`] for optional fields; blank input becomes `None`.
pub fn optional_text(field: &str, value: Option<&str>, max: usize) -> AppResult<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => text(field, v, 1, max).map(Some),
        None => Ok(None),
    }
}

/// Trim an optional string, dropping it when blank.
pub fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 3–50 characters of ASCII letters, digits, `_`, `.` or `-`.
pub fn username(value: &str) -> AppResult<String> {
    let name = value.trim();
    if !(3..=50).contains(&name.len()) {
        return Err(AppError::validation(
            "Username must be between 3 and 50 characters",
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(AppError::validation(
            "Username may only contain letters, digits, '_', '.' and '-'",
        ));
    }
    Ok(name.to_string())
}

/// Minimal shape check on an optional email, lowercased.
pub fn optional_email(value: Option<&str>) -> AppResult<Option<String>> {
    let Some(email) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let valid = email.len() <= 255
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::validation(format!("Invalid email address: '{email}'")));
    }
    Ok(Some(email.to_lowercase()))
}

/// Digits with optional leading `+`, spaces or dashes; 9 to 15 digits.
pub fn phone(value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    let digits = trimmed.chars().filter(char::is_ascii_digit).count();
    let allowed = trimmed
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || c == ' ' || c == '-' || (i == 0 && c == '+'));
    if !allowed || !(9..=15).contains(&digits) {
        return Err(AppError::validation(format!("Invalid phone number: '{trimmed}'")));
    }
    Ok(trimmed.to_string())
}

/// Resolve a province name to its canonical spelling.
pub fn province(value: &str) -> AppResult<String> {
    canonical_province(value)
        .map(String::from)
        .ok_or_else(|| AppError::validation(format!("Unknown province: '{}'", value.trim())))
}

/// [`province`] for optional input.
pub fn optional_province(value: Option<&str>) -> AppResult<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => province(v).map(Some),
        None => Ok(None),
    }
}

/// Require both or neither coordinate, and a valid pair when given.
pub fn coordinates(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<Option<GeoPoint>> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(lat), Some(lon)) => GeoPoint::new(lat, lon)
            .map(Some)
            .ok_or_else(|| AppError::validation("Coordinates are out of range")),
        _ => Err(AppError::validation(
            "latitude and longitude must be given together",
        )),
    }
}

/// Categories are short lowercase slugs.
pub fn category(value: &str) -> AppResult<String> {
    let slug = value.trim().to_lowercase();
    let valid = (2..=50).contains(&slug.len())
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_'));
    if !valid {
        return Err(AppError::validation(
            "category must be 2-50 characters of letters, digits, '-' or '_'",
        ));
    }
    Ok(slug)
}

/// Non-empty rejection or suspension reason.
pub fn reason(value: &str) -> AppResult<String> {
    text("reason", value, 1, 1000)
}

/// De-duplicate image keys, keep their order and cap their number.
pub fn image_keys(keys: Vec<String>, max: usize) -> AppResult<Vec<String>> {
    let mut seen = HashSet::new();
    let keys: Vec<String> = keys
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && seen.insert(k.clone()))
        .collect();
    if keys.len() > max {
        return Err(AppError::validation(format!(
            "At most {max} images are allowed"
        )));
    }
    Ok(keys)
}

/// Check that every key was uploaded by `owner`.
pub async fn keys_owned(media: &MediaRepository, owner: Uuid, keys: &[String]) -> AppResult<()> {
    if keys.is_empty() {
        return Ok(());
    }
    let owned: HashSet<String> = media.keys_owned_by(owner, keys).await?.into_iter().collect();
    if let Some(missing) = keys.iter().find(|k| !owned.contains(*k)) {
        return Err(AppError::validation(format!(
            "Image '{missing}' was not uploaded by you"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_bounds() {
        assert_eq!(text("name", "  Cafe Amazon ", 1, 50).unwrap(), "Cafe Amazon");
        assert!(text("name", "   ", 1, 50).is_err());
        assert!(text("name", "abcdef", 1, 5).is_err());
        // Thai characters count as one each.
        assert!(text("name", "ร้านกาแฟ", 1, 8).is_ok());
    }

    #[test]
    fn test_username_rules() {
        assert!(username("somchai_j").is_ok());
        assert!(username("ab").is_err());
        assert!(username("has space").is_err());
        assert!(username(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_email_and_phone() {
        assert_eq!(
            optional_email(Some(" Somchai@Example.com ")).unwrap(),
            Some("somchai@example.com".to_string())
        );
        assert_eq!(optional_email(Some("")).unwrap(), None);
        assert!(optional_email(Some("nope")).is_err());
        assert!(phone("+66 81-234-5678").is_ok());
        assert!(phone("0812345678").is_ok());
        assert!(phone("12-34").is_err());
        assert!(phone("08x2345678").is_err());
    }

    #[test]
    fn test_province_canonicalised() {
        assert_eq!(province("chiang mai").unwrap(), "Chiang Mai");
        assert!(province("Atlantis").is_err());
        assert_eq!(optional_province(Some("  ")).unwrap(), None);
    }

    #[test]
    fn test_coordinates_pairing() {
        assert!(coordinates(None, None).unwrap().is_none());
        assert!(coordinates(Some(13.7), Some(100.5)).unwrap().is_some());
        assert!(coordinates(Some(13.7), None).is_err());
        assert!(coordinates(Some(95.0), Some(100.5)).is_err());
    }

    #[test]
    fn test_image_keys_dedup_and_cap() {
        let keys = vec!["a.jpg".to_string(), " a.jpg".to_string(), "b.png".to_string()];
        assert_eq!(image_keys(keys.clone(), 5).unwrap(), vec!["a.jpg", "b.png"]);
        assert!(image_keys(keys, 1).is_err());
    }

    #[test]
    fn test_category_is_slugged() {
        assert_eq!(category(" Food ").unwrap(), "food");
        assert_eq!(category("street-food").unwrap(), "street-food");
        assert!(category("x").is_err());
        assert!(category("food & drink").is_err());
    }
}
