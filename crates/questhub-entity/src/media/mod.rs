//! Uploaded media entities.

pub mod model;

pub use model::{CreateMedia, Media, MediaPurpose};
