//! Employee permission resolution from e-mail domain relationship and role label.

pub mod capabilities;
pub mod resolver;
pub mod router;
pub mod similarity;

pub use capabilities::{CapabilitySet, RoleProfile};
pub use resolver::{DecisionBasis, PermissionDecision, PermissionResolver};
pub use router::permissions_router;
pub use similarity::DomainSimilarity;
