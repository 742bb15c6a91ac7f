//! Rider entities.

pub mod model;

pub use model::{CreateRider, Rider, VehicleType};
