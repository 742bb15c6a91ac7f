//! Tourist attraction entities.

pub mod model;

pub use model::{Attraction, CreateAttraction, UpdateAttraction};
