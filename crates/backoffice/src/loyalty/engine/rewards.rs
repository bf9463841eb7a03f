use chrono::{Duration, NaiveDate};

use super::super::domain::{Customer, ManualReward, Reward, RewardId, RewardKind, RewardStatus};
use super::config::LoyaltyConfig;
use super::LoyaltyError;

pub(crate) fn milestone_due(visit_count: u32, config: &LoyaltyConfig) -> bool {
    visit_count > 0 && visit_count % config.milestone_interval == 0
}

/// Free meal reward for reaching `visit_count`. The id is derived from the visit count so
/// that replaying the same visit yields the same reward.
pub(crate) fn milestone_reward(
    customer: &Customer,
    visit_count: u32,
    today: NaiveDate,
    config: &LoyaltyConfig,
) -> Reward {
    Reward {
        id: RewardId(format!("{}-milestone-{}", customer.id(), visit_count)),
        kind: RewardKind::FreeMeal,
        description: format!("Free meal for reaching {visit_count} visits"),
        value: config.milestone_reward_value,
        issued_date: today,
        expiration_date: today + Duration::days(i64::from(config.milestone_expiry_days)),
        redeemed_date: None,
        status: RewardStatus::Available,
    }
}

pub(crate) fn manual_reward(
    customer: &Customer,
    request: ManualReward,
    today: NaiveDate,
) -> Result<Reward, LoyaltyError> {
    let description = request.description.trim();
    if description.is_empty() {
        return Err(LoyaltyError::Validation(
            "reward description must not be empty".to_string(),
        ));
    }
    if !request.value.is_finite() || request.value < 0.0 {
        return Err(LoyaltyError::Validation(format!(
            "reward value must be a non-negative number, got {}",
            request.value
        )));
    }
    if request.kind == RewardKind::Discount && request.value > 100.0 {
        return Err(LoyaltyError::Validation(format!(
            "discount percentage must not exceed 100, got {}",
            request.value
        )));
    }
    if request.expiration_date <= today {
        return Err(LoyaltyError::Validation(format!(
            "expiration date {} must be after {}",
            request.expiration_date, today
        )));
    }

    Ok(Reward {
        id: next_manual_id(customer),
        kind: request.kind,
        description: description.to_string(),
        value: request.value,
        issued_date: today,
        expiration_date: request.expiration_date,
        redeemed_date: None,
        status: RewardStatus::Available,
    })
}

fn next_manual_id(customer: &Customer) -> RewardId {
    let mut sequence = customer.rewards().len() + 1;
    loop {
        let candidate = RewardId(format!("{}-reward-{}", customer.id(), sequence));
        if customer.reward(&candidate).is_none() {
            return candidate;
        }
        sequence += 1;
    }
}

pub(crate) fn redeem(
    customer: &mut Customer,
    reward_id: &RewardId,
    today: NaiveDate,
) -> Result<(), LoyaltyError> {
    let reward = customer
        .rewards_mut()
        .iter_mut()
        .find(|reward| &reward.id == reward_id)
        .ok_or_else(|| LoyaltyError::RewardNotFound(reward_id.clone()))?;

    match reward.status_on(today) {
        RewardStatus::Available => {
            reward.status = RewardStatus::Redeemed;
            reward.redeemed_date = Some(today);
            Ok(())
        }
        status => Err(LoyaltyError::InvalidState {
            reward_id: reward_id.clone(),
            status,
        }),
    }
}

/// Stores `Expired` on every available reward past its expiration date.
pub(crate) fn expire(customer: &mut Customer, today: NaiveDate) -> usize {
    let mut expired = 0;
    for reward in customer.rewards_mut() {
        if reward.status == RewardStatus::Available
            && reward.status_on(today) == RewardStatus::Expired
        {
            reward.status = RewardStatus::Expired;
            expired += 1;
        }
    }
    expired
}
