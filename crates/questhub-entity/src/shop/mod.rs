//! Shop entities.

pub mod model;
pub mod status;

pub use model::{CreateShop, Shop, UpdateShop};
pub use status::ShopStatus;
