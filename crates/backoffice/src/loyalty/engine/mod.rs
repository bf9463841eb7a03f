mod config;
mod rewards;

pub use config::{
    LoyaltyConfig, DEFAULT_MILESTONE_EXPIRY_DAYS, DEFAULT_MILESTONE_INTERVAL,
    DEFAULT_MILESTONE_REWARD_VALUE,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::{Customer, ManualReward, Reward, RewardId, RewardStatus, Visit};
use super::tier::progress_within_band;

/// Errors raised by loyalty engine operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoyaltyError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("reward {0} not found")]
    RewardNotFound(RewardId),
    #[error("reward {reward_id} is {status} and cannot be redeemed")]
    InvalidState {
        reward_id: RewardId,
        status: RewardStatus,
    },
}

/// Result of applying a visit: the new customer snapshot and the milestone reward, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitOutcome {
    pub customer: Customer,
    pub issued_reward: Option<Reward>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardProgress {
    pub visits_remaining: u32,
    pub percent: f64,
}

/// Stateless accrual engine. Every operation takes a customer snapshot and returns a new one;
/// persisting the result and serializing concurrent updates is up to the caller.
#[derive(Debug, Clone)]
pub struct LoyaltyEngine {
    config: LoyaltyConfig,
}

impl Default for LoyaltyEngine {
    fn default() -> Self {
        Self::new(LoyaltyConfig::default())
    }
}

impl LoyaltyEngine {
    pub fn new(config: LoyaltyConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &LoyaltyConfig {
        &self.config
    }

    pub fn record_visit(
        &self,
        customer: &Customer,
        visit: &Visit,
        today: NaiveDate,
    ) -> Result<VisitOutcome, LoyaltyError> {
        validate_visit(visit)?;

        let previous_tier = customer.tier();
        let mut updated = customer.clone();
        updated.accrue(visit.amount, visit.date);

        if updated.tier() != previous_tier {
            debug!(
                customer_id = %updated.id(),
                from = %previous_tier,
                to = %updated.tier(),
                "loyalty tier recomputed"
            );
        }

        let issued_reward = if rewards::milestone_due(updated.visit_count(), &self.config) {
            let reward =
                rewards::milestone_reward(&updated, updated.visit_count(), today, &self.config);
            updated.push_reward(reward.clone());
            info!(
                customer_id = %updated.id(),
                reward_id = %reward.id,
                visit_count = updated.visit_count(),
                "milestone reward issued"
            );
            Some(reward)
        } else {
            None
        };

        Ok(VisitOutcome {
            customer: updated,
            issued_reward,
        })
    }

    pub fn progress_to_next_tier(&self, customer: &Customer) -> f64 {
        progress_within_band(customer.tier(), customer.visit_count(), customer.total_spent())
    }

    /// Visits left in the current milestone cycle. A customer who just earned a reward starts
    /// a fresh cycle and reports the full interval remaining.
    pub fn progress_to_next_reward(&self, customer: &Customer) -> RewardProgress {
        let interval = self.config.milestone_interval;
        let into_cycle = customer.visit_count() % interval;
        RewardProgress {
            visits_remaining: interval - into_cycle,
            percent: f64::from(into_cycle) / f64::from(interval) * 100.0,
        }
    }

    pub fn issue_manual_reward(
        &self,
        customer: &Customer,
        request: ManualReward,
        today: NaiveDate,
    ) -> Result<Customer, LoyaltyError> {
        let reward = rewards::manual_reward(customer, request, today)?;
        let mut updated = customer.clone();
        info!(customer_id = %updated.id(), reward_id = %reward.id, "manual reward issued");
        updated.push_reward(reward);
        Ok(updated)
    }

    pub fn redeem_reward(
        &self,
        customer: &Customer,
        reward_id: &RewardId,
        today: NaiveDate,
    ) -> Result<Customer, LoyaltyError> {
        let mut updated = customer.clone();
        rewards::redeem(&mut updated, reward_id, today)?;
        info!(customer_id = %updated.id(), %reward_id, "reward redeemed");
        Ok(updated)
    }

    /// Caller-driven sweep storing `Expired` on lapsed rewards. Returns the new snapshot and
    /// how many rewards changed.
    pub fn expire_rewards(&self, customer: &Customer, today: NaiveDate) -> (Customer, usize) {
        let mut updated = customer.clone();
        let expired = rewards::expire(&mut updated, today);
        if expired > 0 {
            debug!(customer_id = %updated.id(), expired, "rewards expired");
        }
        (updated, expired)
    }
}

fn validate_visit(visit: &Visit) -> Result<(), LoyaltyError> {
    if !visit.amount.is_finite() || visit.amount < 0.0 {
        return Err(LoyaltyError::Validation(format!(
            "visit amount must be a non-negative number, got {}",
            visit.amount
        )));
    }
    if visit.party_size == 0 {
        return Err(LoyaltyError::Validation(
            "party size must be at least 1".to_string(),
        ));
    }
    if let Some(tip) = visit.tip {
        if !tip.is_finite() || tip < 0.0 {
            return Err(LoyaltyError::Validation(format!(
                "tip must be a non-negative number, got {tip}"
            )));
        }
    }
    Ok(())
}
