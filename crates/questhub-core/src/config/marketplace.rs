//! Marketplace business rules.

use serde::{Deserialize, Serialize};

/// Tunables for partner assignment, commissions and quests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// Hours a partner is skipped after receiving a shop request.
    #[serde(default = "default_cooldown_hours")]
    pub cooldown_hours: u64,
    /// Hours an assigned request may wait for an answer before it is
    /// handed to another partner.
    #[serde(default = "default_assignment_timeout")]
    pub assignment_timeout_hours: u64,
    /// Commission rate, in basis points, given to newly approved partners.
    #[serde(default = "default_commission_bps")]
    pub default_commission_bps: i32,
    /// Upper bound for a single quest reward.
    #[serde(default = "default_max_reward")]
    pub max_reward_points: i64,
    /// Maximum images attached to a shop, quest submission or attraction.
    #[serde(default = "default_max_images")]
    pub max_images_per_entity: usize,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            cooldown_hours: default_cooldown_hours(),
            assignment_timeout_hours: default_assignment_timeout(),
            default_commission_bps: default_commission_bps(),
            max_reward_points: default_max_reward(),
            max_images_per_entity: default_max_images(),
        }
    }
}

fn default_cooldown_hours() -> u64 {
    4
}

fn default_assignment_timeout() -> u64 {
    24
}

fn default_commission_bps() -> i32 {
    1000
}

fn default_max_reward() -> i64 {
    10_000
}

fn default_max_images() -> usize {
    10
}
