//! Quests, their rules, and the submission review flow.

pub mod rules;
pub mod service;
pub mod submission;

pub use service::{QuestRequest, QuestService, QuestUpdate};
pub use submission::{SubmissionRequest, SubmissionService};
