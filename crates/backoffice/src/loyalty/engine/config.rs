use serde::{Deserialize, Serialize};

pub const DEFAULT_MILESTONE_INTERVAL: u32 = 9;
pub const DEFAULT_MILESTONE_REWARD_VALUE: f64 = 100.0;
pub const DEFAULT_MILESTONE_EXPIRY_DAYS: u32 = 90;

/// Milestone reward settings applied by the loyalty engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyConfig {
    /// A free meal is issued every time the visit count reaches a multiple of this.
    pub milestone_interval: u32,
    pub milestone_reward_value: f64,
    pub milestone_expiry_days: u32,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            milestone_interval: DEFAULT_MILESTONE_INTERVAL,
            milestone_reward_value: DEFAULT_MILESTONE_REWARD_VALUE,
            milestone_expiry_days: DEFAULT_MILESTONE_EXPIRY_DAYS,
        }
    }
}

impl LoyaltyConfig {
    /// Replaces out-of-range values with the defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            milestone_interval: if self.milestone_interval == 0 {
                defaults.milestone_interval
            } else {
                self.milestone_interval
            },
            milestone_reward_value: if self.milestone_reward_value.is_finite()
                && self.milestone_reward_value >= 0.0
            {
                self.milestone_reward_value
            } else {
                defaults.milestone_reward_value
            },
            milestone_expiry_days: if self.milestone_expiry_days == 0 {
                defaults.milestone_expiry_days
            } else {
                self.milestone_expiry_days
            },
        }
    }
}
