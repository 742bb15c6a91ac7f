//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Cron-scheduled background job configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression (with seconds) for the shop-request assignment sweep.
    #[serde(default = "default_assignment_cron")]
    pub assignment_sweep_cron: String,
    /// Cron expression (with seconds) for closing expired quests.
    #[serde(default = "default_quest_cron")]
    pub quest_expiry_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            assignment_sweep_cron: default_assignment_cron(),
            quest_expiry_cron: default_quest_cron(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_assignment_cron() -> String {
    "0 */10 * * * *".to_string()
}

fn default_quest_cron() -> String {
    "0 5 * * * *".to_string()
}
