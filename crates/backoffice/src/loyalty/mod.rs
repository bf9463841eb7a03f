//! Customer loyalty accrual: visit registration, tier recomputation, and milestone rewards.
//!
//! [`LoyaltyEngine`] is a pure transform over customer snapshots. [`LoyaltyService`] is the
//! reference caller that persists snapshots, guards against double-counted visits, and fans out
//! notifications.

pub mod domain;
pub mod engine;
pub mod repository;
pub mod router;
pub mod service;
pub mod tier;

#[cfg(test)]
mod tests;

pub use domain::{
    Customer, CustomerId, ManualReward, NewCustomer, PaymentMethod, Reward, RewardId, RewardKind,
    RewardStatus, Tier, Visit, VisitId,
};
pub use engine::{LoyaltyConfig, LoyaltyEngine, LoyaltyError, RewardProgress, VisitOutcome};
pub use repository::{
    CustomerLoyaltyView, CustomerRepository, LoyaltyNotification, NotificationError,
    NotificationPublisher, RepositoryError, RewardView,
};
pub use router::loyalty_router;
pub use service::{LoyaltyService, LoyaltyServiceError, VisitReceipt};
