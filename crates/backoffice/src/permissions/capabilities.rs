use serde::{Deserialize, Serialize};

/// Permission flags controlling which back-office areas an employee can use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub pos: bool,
    pub inventory: bool,
    pub reports: bool,
    pub configuration: bool,
    pub employees: bool,
    pub reservations: bool,
    pub menus: bool,
}

impl CapabilitySet {
    pub const NONE: CapabilitySet = CapabilitySet {
        pos: false,
        inventory: false,
        reports: false,
        configuration: false,
        employees: false,
        reservations: false,
        menus: false,
    };

    pub const fn is_empty(&self) -> bool {
        !(self.pos
            || self.inventory
            || self.reports
            || self.configuration
            || self.employees
            || self.reservations
            || self.menus)
    }

    /// Names of the enabled areas, in declaration order.
    pub fn granted(&self) -> Vec<&'static str> {
        [
            ("pos", self.pos),
            ("inventory", self.inventory),
            ("reports", self.reports),
            ("configuration", self.configuration),
            ("employees", self.employees),
            ("reservations", self.reservations),
            ("menus", self.menus),
        ]
        .into_iter()
        .filter_map(|(name, enabled)| enabled.then_some(name))
        .collect()
    }
}

/// Named capability bundles matched from role labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleProfile {
    Owner,
    Manager,
    Chef,
    Cashier,
    Waiter,
}

impl RoleProfile {
    pub const fn capabilities(self) -> CapabilitySet {
        match self {
            RoleProfile::Owner => CapabilitySet {
                pos: true,
                inventory: true,
                reports: true,
                configuration: true,
                employees: true,
                reservations: true,
                menus: true,
            },
            RoleProfile::Manager => CapabilitySet {
                pos: true,
                inventory: true,
                reports: true,
                configuration: false,
                employees: false,
                reservations: true,
                menus: true,
            },
            RoleProfile::Chef => CapabilitySet {
                inventory: true,
                menus: true,
                ..CapabilitySet::NONE
            },
            RoleProfile::Cashier | RoleProfile::Waiter => CapabilitySet {
                pos: true,
                reservations: true,
                ..CapabilitySet::NONE
            },
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RoleProfile::Owner => "owner",
            RoleProfile::Manager => "manager",
            RoleProfile::Chef => "chef",
            RoleProfile::Cashier => "cashier",
            RoleProfile::Waiter => "waiter",
        }
    }
}
