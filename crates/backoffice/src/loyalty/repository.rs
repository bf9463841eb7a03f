use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    Customer, CustomerId, Reward, RewardId, RewardKind, RewardStatus, Tier, Visit, VisitId,
};
use super::engine::RewardProgress;

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Visits are append-only: there is no update or delete for them.
pub trait CustomerRepository: Send + Sync {
    fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError>;
    fn update(&self, customer: Customer) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError>;
    /// Appends `visit` to the customer's history and stores the accrued snapshot as one write.
    /// Returns `Conflict` when the visit id is already recorded for any customer; on any error
    /// neither the visit nor the snapshot is stored.
    fn save_visit(&self, customer: Customer, visit: Visit) -> Result<(), RepositoryError>;
    fn visits(&self, customer_id: &CustomerId) -> Result<Vec<Visit>, RepositoryError>;
    fn contains_visit(&self, visit_id: &VisitId) -> Result<bool, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for customer-facing notices (e-mail, SMS, front-of-house display).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: LoyaltyNotification) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyNotification {
    pub template: String,
    pub customer_id: CustomerId,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Reward as shown to staff, with the status evaluated for a given day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardView {
    pub id: RewardId,
    pub kind: RewardKind,
    pub description: String,
    pub value: f64,
    pub issued_date: NaiveDate,
    pub expiration_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeemed_date: Option<NaiveDate>,
    pub status: RewardStatus,
}

impl RewardView {
    pub fn from_reward(reward: &Reward, today: NaiveDate) -> Self {
        Self {
            id: reward.id.clone(),
            kind: reward.kind,
            description: reward.description.clone(),
            value: reward.value,
            issued_date: reward.issued_date,
            expiration_date: reward.expiration_date,
            redeemed_date: reward.redeemed_date,
            status: reward.status_on(today),
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == RewardStatus::Available
    }
}

/// Loyalty card summary for a customer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerLoyaltyView {
    pub customer_id: CustomerId,
    pub name: String,
    pub tier: Tier,
    pub tier_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_tier: Option<Tier>,
    pub visit_count: u32,
    pub total_spent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_visit_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_discount_percent: Option<f64>,
    pub progress_to_next_tier: f64,
    pub next_reward: RewardProgress,
    pub rewards: Vec<RewardView>,
}

impl CustomerLoyaltyView {
    pub fn available_rewards(&self) -> impl Iterator<Item = &RewardView> {
        self.rewards.iter().filter(|reward| reward.is_available())
    }
}
