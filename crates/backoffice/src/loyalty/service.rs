use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{
    Customer, CustomerId, ManualReward, NewCustomer, Reward, RewardId, Tier, Visit, VisitId,
};
use super::engine::{LoyaltyConfig, LoyaltyEngine, LoyaltyError};
use super::repository::{
    CustomerLoyaltyView, CustomerRepository, LoyaltyNotification, NotificationPublisher,
    RepositoryError, RewardView,
};

/// Service composing the loyalty engine with storage and notifications.
///
/// Read-modify-write cycles on a customer are serialized through a per-customer lock, and
/// visit ids are checked against history so a resubmitted visit is never counted twice.
pub struct LoyaltyService<R, N> {
    repository: Arc<R>,
    notifications: Arc<N>,
    engine: Arc<LoyaltyEngine>,
    locks: Mutex<HashMap<CustomerId, Arc<Mutex<()>>>>,
}

static CUSTOMER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_customer_id() -> CustomerId {
    let id = CUSTOMER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    CustomerId(format!("cus-{id:06}"))
}

/// What the caller gets back after a visit is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitReceipt {
    pub customer: Customer,
    pub previous_tier: Tier,
    pub issued_reward: Option<Reward>,
}

impl VisitReceipt {
    pub fn tier_changed(&self) -> bool {
        self.customer.tier() != self.previous_tier
    }
}

impl<R, N> LoyaltyService<R, N>
where
    R: CustomerRepository + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(repository: Arc<R>, notifications: Arc<N>, config: LoyaltyConfig) -> Self {
        Self {
            repository,
            notifications,
            engine: Arc::new(LoyaltyEngine::new(config)),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn engine(&self) -> &LoyaltyEngine {
        &self.engine
    }

    /// Register a customer, optionally carrying an opening balance from a previous system.
    pub fn register(&self, request: NewCustomer) -> Result<Customer, LoyaltyServiceError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(
                LoyaltyError::Validation("customer name must not be empty".to_string()).into(),
            );
        }
        if !request.opening_total_spent.is_finite() || request.opening_total_spent < 0.0 {
            return Err(LoyaltyError::Validation(format!(
                "opening spend must be a non-negative number, got {}",
                request.opening_total_spent
            ))
            .into());
        }
        if let Some(discount) = request.custom_discount_percent {
            if !(0.0..=100.0).contains(&discount) {
                return Err(LoyaltyError::Validation(format!(
                    "custom discount must be between 0 and 100, got {discount}"
                ))
                .into());
            }
        }

        let mut customer = Customer::with_history(
            next_customer_id(),
            name,
            request.opening_visit_count,
            request.opening_total_spent,
        );
        customer.email = request.email;
        customer.phone = request.phone;
        customer.custom_discount_percent = request.custom_discount_percent;

        let stored = self.repository.insert(customer)?;
        Ok(stored)
    }

    pub fn get(&self, customer_id: &CustomerId) -> Result<Customer, LoyaltyServiceError> {
        let customer = self
            .repository
            .fetch(customer_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(customer)
    }

    /// Apply a completed visit, persist the visit together with the updated customer, and
    /// notify the customer when a milestone reward was earned.
    pub fn record_visit(
        &self,
        customer_id: &CustomerId,
        visit: Visit,
        today: NaiveDate,
    ) -> Result<VisitReceipt, LoyaltyServiceError> {
        let outcome = self.with_customer_lock(customer_id, || {
            if self.repository.contains_visit(&visit.id)? {
                warn!(%customer_id, visit_id = %visit.id, "duplicate visit rejected");
                return Err(LoyaltyServiceError::DuplicateVisit(visit.id.clone()));
            }

            let customer = self.get(customer_id)?;
            let previous_tier = customer.tier();
            let outcome = self.engine.record_visit(&customer, &visit, today)?;

            let visit_id = visit.id.clone();
            match self.repository.save_visit(outcome.customer.clone(), visit) {
                Ok(()) => Ok((previous_tier, outcome)),
                // Another customer claimed the same visit id between the check and the write.
                Err(RepositoryError::Conflict) => {
                    warn!(%customer_id, %visit_id, "duplicate visit rejected");
                    Err(LoyaltyServiceError::DuplicateVisit(visit_id))
                }
                Err(err) => Err(err.into()),
            }
        });
        let (previous_tier, outcome) = outcome?;

        if let Some(reward) = &outcome.issued_reward {
            self.notify_reward(&outcome.customer, reward);
        }

        Ok(VisitReceipt {
            customer: outcome.customer,
            previous_tier,
            issued_reward: outcome.issued_reward,
        })
    }

    pub fn issue_reward(
        &self,
        customer_id: &CustomerId,
        request: ManualReward,
        today: NaiveDate,
    ) -> Result<Customer, LoyaltyServiceError> {
        self.modify(customer_id, |engine, customer| {
            engine.issue_manual_reward(customer, request, today)
        })
    }

    pub fn redeem_reward(
        &self,
        customer_id: &CustomerId,
        reward_id: &RewardId,
        today: NaiveDate,
    ) -> Result<Customer, LoyaltyServiceError> {
        self.modify(customer_id, |engine, customer| {
            engine.redeem_reward(customer, reward_id, today)
        })
    }

    /// Persist `Expired` on lapsed rewards. Returns how many changed.
    pub fn expire_rewards(
        &self,
        customer_id: &CustomerId,
        today: NaiveDate,
    ) -> Result<usize, LoyaltyServiceError> {
        self.with_customer_lock(customer_id, || {
            let customer = self.get(customer_id)?;
            let (updated, expired) = self.engine.expire_rewards(&customer, today);
            if expired > 0 {
                self.repository.update(updated)?;
            }
            Ok(expired)
        })
    }

    pub fn summary(
        &self,
        customer_id: &CustomerId,
        today: NaiveDate,
    ) -> Result<CustomerLoyaltyView, LoyaltyServiceError> {
        let customer = self.get(customer_id)?;
        Ok(self.view(&customer, today))
    }

    pub fn view(&self, customer: &Customer, today: NaiveDate) -> CustomerLoyaltyView {
        CustomerLoyaltyView {
            customer_id: customer.id().clone(),
            name: customer.name.clone(),
            tier: customer.tier(),
            tier_label: customer.tier().label(),
            next_tier: customer.tier().next(),
            visit_count: customer.visit_count(),
            total_spent: customer.total_spent(),
            last_visit_date: customer.last_visit_date(),
            custom_discount_percent: customer.custom_discount_percent,
            progress_to_next_tier: self.engine.progress_to_next_tier(customer),
            next_reward: self.engine.progress_to_next_reward(customer),
            rewards: customer
                .rewards()
                .iter()
                .map(|reward| RewardView::from_reward(reward, today))
                .collect(),
        }
    }

    pub fn visit_history(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Visit>, LoyaltyServiceError> {
        self.get(customer_id)?;
        Ok(self.repository.visits(customer_id)?)
    }

    fn modify<F>(
        &self,
        customer_id: &CustomerId,
        change: F,
    ) -> Result<Customer, LoyaltyServiceError>
    where
        F: FnOnce(&LoyaltyEngine, &Customer) -> Result<Customer, LoyaltyError>,
    {
        self.with_customer_lock(customer_id, || {
            let customer = self.get(customer_id)?;
            let updated = change(&self.engine, &customer)?;
            self.repository.update(updated.clone())?;
            Ok(updated)
        })
    }

    /// Runs `work` while holding the lock for `customer_id`.
    ///
    /// Only registered customers get a lock slot, and the slot is dropped again once no other
    /// caller holds or waits on it, so the table stays bounded by in-flight customers.
    fn with_customer_lock<T, F>(
        &self,
        customer_id: &CustomerId,
        work: F,
    ) -> Result<T, LoyaltyServiceError>
    where
        F: FnOnce() -> Result<T, LoyaltyServiceError>,
    {
        self.get(customer_id)?;

        let lock = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(customer_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            work()
        };

        // Slots are only cloned under the table lock, so a count of 2 (table + ours) means
        // nobody else is waiting.
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if Arc::strong_count(&lock) == 2 {
            locks.remove(customer_id);
        }
        result
    }

    #[cfg(test)]
    pub(crate) fn tracked_locks(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn notify_reward(&self, customer: &Customer, reward: &Reward) {
        let mut details = BTreeMap::new();
        details.insert("reward_id".to_string(), reward.id.to_string());
        details.insert("description".to_string(), reward.description.clone());
        details.insert("expires_on".to_string(), reward.expiration_date.to_string());
        details.insert("visit_count".to_string(), customer.visit_count().to_string());

        let notification = LoyaltyNotification {
            template: "free_meal_earned".to_string(),
            customer_id: customer.id().clone(),
            details,
        };

        if let Err(err) = self.notifications.publish(notification) {
            warn!(
                customer_id = %customer.id(),
                reward_id = %reward.id,
                error = %err,
                "reward notification failed"
            );
        }
    }
}

/// Error raised by the loyalty service.
#[derive(Debug, thiserror::Error)]
pub enum LoyaltyServiceError {
    #[error(transparent)]
    Loyalty(#[from] LoyaltyError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("visit {0} has already been recorded")]
    DuplicateVisit(VisitId),
}
