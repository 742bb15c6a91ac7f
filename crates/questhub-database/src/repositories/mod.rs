//! Repository implementations for all QuestHub entities.

pub mod attraction;
pub mod fee_split;
pub mod media;
pub mod partner;
pub mod points;
pub mod quest;
pub mod rider;
pub mod shop;
pub mod shop_request;
pub mod submission;
pub mod user;

pub use attraction::AttractionRepository;
pub use fee_split::FeeSplitRepository;
pub use media::MediaRepository;
pub use partner::PartnerRepository;
pub use points::PointRepository;
pub use quest::QuestRepository;
pub use rider::RiderRepository;
pub use shop::ShopRepository;
pub use shop_request::ShopRequestRepository;
pub use submission::SubmissionRepository;
pub use user::UserRepository;

use questhub_core::error::{AppError, ErrorKind};

/// Wrap a sqlx error as a database error with context.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

/// Name of the violated unique constraint, if `e` is a unique violation.
pub(crate) fn unique_violation(e: &sqlx::Error) -> Option<&str> {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => db_err.constraint(),
        _ => None,
    }
}

/// Build an `ILIKE` pattern for a free-text search term.
pub(crate) fn like_pattern(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            let escaped = t.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
            format!("%{escaped}%")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(Some(" cafe ")), Some("%cafe%".to_string()));
        assert_eq!(like_pattern(Some("50%_off")), Some("%50\\%\\_off%".to_string()));
        assert_eq!(like_pattern(Some("   ")), None);
        assert_eq!(like_pattern(None), None);
    }
}
