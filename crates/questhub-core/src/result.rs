//! Convenience result type alias for QuestHub.

use crate::error::AppError;

/// A specialized `Result` type for QuestHub operations.
pub type AppResult<T> = Result<T, AppError>;
