use super::common::*;
use crate::loyalty::domain::{RewardKind, RewardStatus, Tier};
use crate::loyalty::{LoyaltyConfig, LoyaltyEngine, LoyaltyError};
use chrono::Duration;

#[test]
fn fifth_visit_promotes_to_silver_without_reward() {
    let engine = LoyaltyEngine::default();
    let customer = customer_at(4, 380.0);

    let outcome = engine
        .record_visit(&customer, &visit("v-5", 50.0), today())
        .expect("visit applies");

    assert_eq!(outcome.customer.visit_count(), 5);
    assert_eq!(outcome.customer.total_spent(), 430.0);
    assert_eq!(outcome.customer.tier(), Tier::Silver);
    assert!(outcome.issued_reward.is_none());
    assert!(outcome.customer.rewards().is_empty());
}

#[test]
fn ninth_visit_issues_free_meal_and_lands_in_silver() {
    let engine = LoyaltyEngine::default();
    let customer = customer_at(8, 300.0);

    let outcome = engine
        .record_visit(&customer, &visit("v-9", 20.0), today())
        .expect("visit applies");

    assert_eq!(outcome.customer.visit_count(), 9);
    assert_eq!(outcome.customer.total_spent(), 320.0);
    assert_eq!(outcome.customer.tier(), Tier::Silver);

    let reward = outcome.issued_reward.expect("milestone reward");
    assert_eq!(reward.kind, RewardKind::FreeMeal);
    assert_eq!(reward.value, 100.0);
    assert_eq!(reward.status, RewardStatus::Available);
    assert_eq!(reward.issued_date, today());
    assert_eq!(reward.expiration_date, today() + Duration::days(90));
    assert_eq!(outcome.customer.rewards(), &[reward]);
}

#[test]
fn visit_sets_last_visit_date_from_the_visit() {
    let engine = LoyaltyEngine::default();
    let mut dined = visit("v-1", 12.5);
    dined.date = today() - Duration::days(3);

    let outcome = engine
        .record_visit(&customer_at(0, 0.0), &dined, today())
        .expect("visit applies");

    assert_eq!(outcome.customer.last_visit_date(), Some(dined.date));
}

#[test]
fn milestone_rewards_match_floor_of_visit_count() {
    let engine = LoyaltyEngine::default();
    let mut customer = customer_at(0, 0.0);
    let mut issued = 0;

    for n in 1..=30u32 {
        let outcome = engine
            .record_visit(&customer, &visit(&format!("v-{n}"), 10.0), today())
            .expect("visit applies");
        assert_eq!(outcome.issued_reward.is_some(), n % 9 == 0, "visit {n}");
        if outcome.issued_reward.is_some() {
            issued += 1;
        }
        customer = outcome.customer;
    }

    assert_eq!(issued, 30 / 9);
    assert_eq!(customer.rewards().len(), 3);
    let ids: Vec<_> = customer.rewards().iter().map(|r| r.id.0.clone()).collect();
    assert_eq!(
        ids,
        vec![
            "cus-test-milestone-9",
            "cus-test-milestone-18",
            "cus-test-milestone-27"
        ]
    );
}

#[test]
fn totals_are_the_sum_of_visit_amounts() {
    let engine = LoyaltyEngine::default();
    let amounts = [18.25, 0.0, 42.0, 77.75, 5.5, 130.0];
    let mut customer = customer_at(0, 0.0);

    for (index, amount) in amounts.iter().enumerate() {
        customer = engine
            .record_visit(&customer, &visit(&format!("v-{index}"), *amount), today())
            .expect("visit applies")
            .customer;
    }

    assert_eq!(customer.visit_count(), amounts.len() as u32);
    assert!((customer.total_spent() - amounts.iter().sum::<f64>()).abs() < 1e-9);
}

#[test]
fn tier_never_decreases_across_visits() {
    let engine = LoyaltyEngine::default();
    let mut customer = customer_at(0, 0.0);
    let mut previous = customer.tier();

    for n in 0..20 {
        let amount = if n % 3 == 0 { 0.0 } else { 61.0 };
        customer = engine
            .record_visit(&customer, &visit(&format!("v-{n}"), amount), today())
            .expect("visit applies")
            .customer;
        assert!(customer.tier() >= previous);
        previous = customer.tier();
    }

    assert_eq!(customer.tier(), Tier::Platinum);
}

#[test]
fn spend_alone_can_reach_platinum() {
    let engine = LoyaltyEngine::default();
    let outcome = engine
        .record_visit(&customer_at(0, 0.0), &visit("banquet", 1000.0), today())
        .expect("visit applies");
    assert_eq!(outcome.customer.tier(), Tier::Platinum);
    assert_eq!(engine.progress_to_next_tier(&outcome.customer), 100.0);
}

#[test]
fn same_inputs_produce_same_outputs() {
    let engine = LoyaltyEngine::default();
    let customer = customer_at(8, 300.0);
    let dined = visit("v-9", 20.0);

    let first = engine.record_visit(&customer, &dined, today()).expect("first");
    let second = engine.record_visit(&customer, &dined, today()).expect("second");

    assert_eq!(first, second);
    assert_eq!(customer.visit_count(), 8, "input snapshot is untouched");
}

#[test]
fn rejects_negative_or_non_finite_amounts() {
    let engine = LoyaltyEngine::default();
    let customer = customer_at(2, 40.0);

    for amount in [-0.01, f64::NAN, f64::INFINITY] {
        match engine.record_visit(&customer, &visit("bad", amount), today()) {
            Err(LoyaltyError::Validation(message)) => assert!(message.contains("amount")),
            other => panic!("expected validation error for {amount}, got {other:?}"),
        }
    }
}

#[test]
fn rejects_empty_party_and_negative_tip() {
    let engine = LoyaltyEngine::default();
    let customer = customer_at(2, 40.0);

    let mut empty_party = visit("empty", 30.0);
    empty_party.party_size = 0;
    assert!(matches!(
        engine.record_visit(&customer, &empty_party, today()),
        Err(LoyaltyError::Validation(_))
    ));

    let mut negative_tip = visit("tip", 30.0);
    negative_tip.tip = Some(-2.0);
    assert!(matches!(
        engine.record_visit(&customer, &negative_tip, today()),
        Err(LoyaltyError::Validation(_))
    ));
}

#[test]
fn reward_progress_resets_to_a_full_cycle_after_milestone() {
    let engine = LoyaltyEngine::default();

    let fresh = engine.progress_to_next_reward(&customer_at(0, 0.0));
    assert_eq!(fresh.visits_remaining, 9);
    assert_eq!(fresh.percent, 0.0);

    let midway = engine.progress_to_next_reward(&customer_at(3, 0.0));
    assert_eq!(midway.visits_remaining, 6);
    assert!((midway.percent - 100.0 / 3.0).abs() < 1e-9);

    let just_rewarded = engine.progress_to_next_reward(&customer_at(9, 0.0));
    assert_eq!(just_rewarded.visits_remaining, 9);
    assert_eq!(just_rewarded.percent, 0.0);

    let almost = engine.progress_to_next_reward(&customer_at(17, 0.0));
    assert_eq!(almost.visits_remaining, 1);
}

#[test]
fn tier_progress_uses_current_band() {
    let engine = LoyaltyEngine::default();
    assert_eq!(engine.progress_to_next_tier(&customer_at(2, 100.0)), 40.0);
    assert_eq!(engine.progress_to_next_tier(&customer_at(5, 575.0)), 50.0);
    assert_eq!(engine.progress_to_next_tier(&customer_at(14, 0.0)), 80.0);
    assert_eq!(engine.progress_to_next_tier(&customer_at(15, 0.0)), 100.0);
}

#[test]
fn configured_interval_changes_milestone_cadence() {
    let engine = LoyaltyEngine::new(LoyaltyConfig {
        milestone_interval: 3,
        milestone_reward_value: 25.0,
        milestone_expiry_days: 30,
    });

    let outcome = engine
        .record_visit(&customer_at(2, 0.0), &visit("v-3", 10.0), today())
        .expect("visit applies");
    let reward = outcome.issued_reward.expect("third visit rewarded");
    assert_eq!(reward.value, 25.0);
    assert_eq!(reward.expiration_date, today() + Duration::days(30));
}

#[test]
fn zero_interval_falls_back_to_default() {
    let engine = LoyaltyEngine::new(LoyaltyConfig {
        milestone_interval: 0,
        ..LoyaltyConfig::default()
    });
    assert_eq!(engine.config().milestone_interval, 9);
}
