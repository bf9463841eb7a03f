use serde::{Deserialize, Serialize};
use tracing::debug;

use super::capabilities::{CapabilitySet, RoleProfile};
use super::similarity::{classify, DomainSimilarity};

/// Keywords that, combined with a related e-mail domain, earn manager access.
const DOMAIN_ADMIN_KEYWORDS: &[&str] = &["admin", "gerente", "supervisor"];

/// Role label rule: any keyword match selects the profile.
#[derive(Debug, Clone, Copy)]
pub struct RoleRule {
    pub profile: RoleProfile,
    pub keywords: &'static [&'static str],
}

/// Evaluated top-down; the first rule with a matching keyword wins.
pub const ROLE_RULES: &[RoleRule] = &[
    RoleRule {
        profile: RoleProfile::Owner,
        keywords: &["owner", "propietario", "dueño"],
    },
    RoleRule {
        profile: RoleProfile::Manager,
        keywords: &["manager", "gerente", "supervisor"],
    },
    RoleRule {
        profile: RoleProfile::Chef,
        keywords: &["chef", "cocinero", "cook"],
    },
    RoleRule {
        profile: RoleProfile::Cashier,
        keywords: &["cashier", "cajero"],
    },
    RoleRule {
        profile: RoleProfile::Waiter,
        keywords: &["waiter", "mesero", "server"],
    },
];

/// Why a capability set was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "profile", rename_all = "snake_case")]
pub enum DecisionBasis {
    /// Same e-mail domain as the restaurant.
    DomainOwner,
    /// Related domain plus an administrative role label.
    DomainAdmin,
    RoleLabel(RoleProfile),
    NoMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDecision {
    pub similarity: DomainSimilarity,
    pub basis: DecisionBasis,
    pub capabilities: CapabilitySet,
}

/// Maps an employee's e-mail relationship and role label to a capability set.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionResolver;

impl PermissionResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(
        &self,
        employee_email: &str,
        restaurant_email: &str,
        role_label: &str,
    ) -> CapabilitySet {
        self.explain(employee_email, restaurant_email, role_label)
            .capabilities
    }

    pub fn explain(
        &self,
        employee_email: &str,
        restaurant_email: &str,
        role_label: &str,
    ) -> PermissionDecision {
        let similarity = classify(employee_email, restaurant_email);
        let role = role_label.trim().to_lowercase();

        let (basis, capabilities) = match similarity {
            DomainSimilarity::High => (
                DecisionBasis::DomainOwner,
                RoleProfile::Owner.capabilities(),
            ),
            DomainSimilarity::Medium if contains_any(&role, DOMAIN_ADMIN_KEYWORDS) => (
                DecisionBasis::DomainAdmin,
                RoleProfile::Manager.capabilities(),
            ),
            _ => match profile_for_label(&role) {
                Some(profile) => (DecisionBasis::RoleLabel(profile), profile.capabilities()),
                None => (DecisionBasis::NoMatch, CapabilitySet::NONE),
            },
        };

        debug!(?similarity, ?basis, role = %role_label, "permission decision");

        PermissionDecision {
            similarity,
            basis,
            capabilities,
        }
    }
}

/// Profile whose keywords appear in `role_label`; expects an already lower-cased label.
pub fn profile_for_label(role_label: &str) -> Option<RoleProfile> {
    ROLE_RULES
        .iter()
        .find(|rule| contains_any(role_label, rule.keywords))
        .map(|rule| rule.profile)
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| haystack.contains(keyword))
}
