use super::domain::Tier;

/// Qualification threshold for a tier. A customer qualifies when either bound is met.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierRule {
    pub tier: Tier,
    pub min_visits: u32,
    pub min_spend: f64,
}

impl TierRule {
    fn qualifies(&self, visit_count: u32, total_spent: f64) -> bool {
        visit_count >= self.min_visits || total_spent >= self.min_spend
    }
}

/// Evaluated top-down; the first qualifying rule wins.
pub const TIER_RULES: [TierRule; 4] = [
    TierRule {
        tier: Tier::Platinum,
        min_visits: 15,
        min_spend: 1000.0,
    },
    TierRule {
        tier: Tier::Gold,
        min_visits: 10,
        min_spend: 750.0,
    },
    TierRule {
        tier: Tier::Silver,
        min_visits: 5,
        min_spend: 400.0,
    },
    TierRule {
        tier: Tier::Bronze,
        min_visits: 0,
        min_spend: 0.0,
    },
];

pub fn rule_for(tier: Tier) -> TierRule {
    TIER_RULES
        .iter()
        .copied()
        .find(|rule| rule.tier == tier)
        .unwrap_or(TIER_RULES[TIER_RULES.len() - 1])
}

pub fn tier_for(visit_count: u32, total_spent: f64) -> Tier {
    TIER_RULES
        .iter()
        .find(|rule| rule.qualifies(visit_count, total_spent))
        .map(|rule| rule.tier)
        .unwrap_or(Tier::Bronze)
}

/// Percent progress through the band between `tier` and the next tier, taking the better of the
/// visit and spend measures. Platinum is always 100.
pub fn progress_within_band(tier: Tier, visit_count: u32, total_spent: f64) -> f64 {
    let Some(next) = tier.next() else {
        return 100.0;
    };
    let floor = rule_for(tier);
    let ceiling = rule_for(next);

    let visits = band_percent(
        visit_count as f64,
        floor.min_visits as f64,
        ceiling.min_visits as f64,
    );
    let spend = band_percent(total_spent, floor.min_spend, ceiling.min_spend);

    visits.max(spend)
}

fn band_percent(value: f64, start: f64, end: f64) -> f64 {
    let width = end - start;
    if width <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    ((value - start) / width * 100.0).clamp(0.0, 100.0)
}
