//! Admin-only handlers. Every service call re-checks the caller's role.

pub mod attractions;
pub mod fee_splits;
pub mod partners;
pub mod riders;
pub mod shop_requests;
pub mod shops;
pub mod users;
