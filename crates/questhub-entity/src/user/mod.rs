//! User domain entities.

pub mod model;
pub mod points;
pub mod role;
pub mod status;

pub use model::{CreateUser, User};
pub use points::PointTransaction;
pub use role::UserRole;
pub use status::UserStatus;
