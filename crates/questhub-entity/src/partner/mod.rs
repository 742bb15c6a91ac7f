//! Partner (referral agent) entities.

pub mod model;

pub use model::{CreatePartner, Partner};
