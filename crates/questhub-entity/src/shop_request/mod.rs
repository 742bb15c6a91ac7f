//! Shop signup request entities.

pub mod model;
pub mod status;

pub use model::{AssignmentDecision, AssignmentGuard, CreateShopRequest, ShopRequest};
pub use status::ShopRequestStatus;
