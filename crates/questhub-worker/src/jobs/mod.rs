//! Marketplace job implementations.

pub mod assignment;
pub mod quest_expiry;

pub use assignment::AssignmentSweepJob;
pub use quest_expiry::QuestExpiryJob;
