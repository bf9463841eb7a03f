use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::tier::tier_for;

/// Identifier wrapper for loyalty customers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomerId(pub String);

/// Identifier wrapper for recorded visits; used to reject double submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisitId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RewardId(pub String);

macro_rules! display_inner {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        })*
    };
}

display_inner!(CustomerId, VisitId, RewardId);

/// Loyalty rank derived from cumulative visits and spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    pub const fn label(self) -> &'static str {
        match self {
            Tier::Bronze => "bronze",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
            Tier::Platinum => "platinum",
        }
    }

    pub const fn next(self) -> Option<Tier> {
        match self {
            Tier::Bronze => Some(Tier::Silver),
            Tier::Silver => Some(Tier::Gold),
            Tier::Gold => Some(Tier::Platinum),
            Tier::Platinum => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Other,
}

/// Completed dining event. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: VisitId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub amount: f64,
    pub party_size: u32,
    pub table_number: u32,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub tip: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    FreeMeal,
    Discount,
    Gift,
    Other,
}

/// Stored lifecycle state of a reward. See [`Reward::status_on`] for the effective state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardStatus {
    Available,
    Redeemed,
    Expired,
}

impl RewardStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RewardStatus::Available => "available",
            RewardStatus::Redeemed => "redeemed",
            RewardStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for RewardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Milestone or manually issued benefit.
///
/// `value` is a percentage for [`RewardKind::Discount`] and a currency amount otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub id: RewardId,
    pub kind: RewardKind,
    pub description: String,
    pub value: f64,
    pub issued_date: NaiveDate,
    pub expiration_date: NaiveDate,
    #[serde(default)]
    pub redeemed_date: Option<NaiveDate>,
    pub status: RewardStatus,
}

impl Reward {
    /// Effective status as of `today`. An available reward lapses the day after it expires.
    pub fn status_on(&self, today: NaiveDate) -> RewardStatus {
        match self.status {
            RewardStatus::Available if self.expiration_date < today => RewardStatus::Expired,
            status => status,
        }
    }
}

/// Staff-entered details for a manually issued reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualReward {
    pub kind: RewardKind,
    pub description: String,
    pub value: f64,
    pub expiration_date: NaiveDate,
}

/// Customer identity plus accrual state.
///
/// Counters and tier are only reachable through accessors so that the tier always matches the
/// `(visit_count, total_spent)` pair. Deserialized snapshots recompute the tier on the way in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CustomerSnapshot")]
pub struct Customer {
    id: CustomerId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    visit_count: u32,
    total_spent: f64,
    last_visit_date: Option<NaiveDate>,
    tier: Tier,
    pub custom_discount_percent: Option<f64>,
    rewards: Vec<Reward>,
}

impl Customer {
    pub fn new(id: CustomerId, name: impl Into<String>) -> Self {
        Self::with_history(id, name, 0, 0.0)
    }

    /// Opening balance for customers imported with prior history.
    pub fn with_history(
        id: CustomerId,
        name: impl Into<String>,
        visit_count: u32,
        total_spent: f64,
    ) -> Self {
        let total_spent = sanitize_spend(total_spent);
        Self {
            id,
            name: name.into(),
            email: None,
            phone: None,
            visit_count,
            total_spent,
            last_visit_date: None,
            tier: tier_for(visit_count, total_spent),
            custom_discount_percent: None,
            rewards: Vec::new(),
        }
    }

    pub fn id(&self) -> &CustomerId {
        &self.id
    }

    pub fn visit_count(&self) -> u32 {
        self.visit_count
    }

    pub fn total_spent(&self) -> f64 {
        self.total_spent
    }

    pub fn last_visit_date(&self) -> Option<NaiveDate> {
        self.last_visit_date
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    pub fn reward(&self, reward_id: &RewardId) -> Option<&Reward> {
        self.rewards.iter().find(|reward| &reward.id == reward_id)
    }

    pub(super) fn accrue(&mut self, amount: f64, date: NaiveDate) {
        self.visit_count = self.visit_count.saturating_add(1);
        self.total_spent += sanitize_spend(amount);
        self.last_visit_date = Some(date);
        self.tier = tier_for(self.visit_count, self.total_spent);
    }

    pub(super) fn push_reward(&mut self, reward: Reward) {
        self.rewards.push(reward);
    }

    pub(super) fn rewards_mut(&mut self) -> &mut [Reward] {
        &mut self.rewards
    }
}

fn sanitize_spend(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}

#[derive(Deserialize)]
struct CustomerSnapshot {
    id: CustomerId,
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    visit_count: u32,
    #[serde(default)]
    total_spent: f64,
    #[serde(default)]
    last_visit_date: Option<NaiveDate>,
    #[serde(default)]
    custom_discount_percent: Option<f64>,
    #[serde(default)]
    rewards: Vec<Reward>,
}

impl From<CustomerSnapshot> for Customer {
    fn from(snapshot: CustomerSnapshot) -> Self {
        let mut customer = Customer::with_history(
            snapshot.id,
            snapshot.name,
            snapshot.visit_count,
            snapshot.total_spent,
        );
        customer.email = snapshot.email;
        customer.phone = snapshot.phone;
        customer.last_visit_date = snapshot.last_visit_date;
        customer.custom_discount_percent = snapshot.custom_discount_percent;
        customer.rewards = snapshot.rewards;
        customer
    }
}

/// Registration payload for a new loyalty customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub custom_discount_percent: Option<f64>,
    /// Visits carried over from a previous system.
    #[serde(default)]
    pub opening_visit_count: u32,
    #[serde(default)]
    pub opening_total_spent: f64,
}
