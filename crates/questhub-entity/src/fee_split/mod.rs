//! Commission bookkeeping entities.

pub mod model;

pub use model::{CreateFeeSplit, FeeSplitSummary, FeeType, ShopFeeSplitRecord};
