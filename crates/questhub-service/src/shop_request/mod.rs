//! Shop signup requests and their partner assignment lifecycle.

pub mod service;

pub use service::{ShopRequestService, ShopRequestSubmission, SweepReport};
