//! Quest and submission entities.

pub mod model;
pub mod submission;

pub use model::{CreateQuest, Quest, QuestStatus, QuestType, UpdateQuest};
pub use submission::{CreateSubmission, QuestSubmission, SubmissionStatus};
