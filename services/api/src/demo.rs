use crate::infra::{InMemoryCustomerRepository, InMemoryNotificationOutbox};
use backoffice::config::AppConfig;
use backoffice::error::AppError;
use backoffice::loyalty::{
    CustomerId, CustomerLoyaltyView, LoyaltyService, NewCustomer, PaymentMethod, Visit, VisitId,
};
use backoffice::permissions::{PermissionDecision, PermissionResolver};
use chrono::{Duration, Local, NaiveDate, NaiveTime};
use clap::Args;
use std::sync::Arc;

type DemoService = LoyaltyService<InMemoryCustomerRepository, InMemoryNotificationOutbox>;

#[derive(Args, Debug)]
pub(crate) struct SimulateArgs {
    /// Visit amounts in chronological order, comma separated (e.g. 42.5,60,18)
    #[arg(long, value_delimiter = ',', required = true)]
    pub(crate) visits: Vec<f64>,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Visits carried over before the simulation starts
    #[arg(long, default_value_t = 0)]
    pub(crate) opening_visits: u32,
    /// Spend carried over before the simulation starts
    #[arg(long, default_value_t = 0.0)]
    pub(crate) opening_spend: f64,
}

#[derive(Args, Debug)]
pub(crate) struct ResolveArgs {
    /// Employee e-mail address
    #[arg(long)]
    pub(crate) employee_email: String,
    /// Restaurant contact e-mail address
    #[arg(long)]
    pub(crate) restaurant_email: String,
    /// Free-text role label, e.g. "Gerente" or "line cook"
    #[arg(long, default_value = "")]
    pub(crate) role: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the evaluation date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Skip the staff permission portion of the demo.
    #[arg(long)]
    pub(crate) skip_permissions: bool,
}

pub(crate) fn run_simulation(args: SimulateArgs) -> Result<(), AppError> {
    let SimulateArgs {
        visits,
        today,
        opening_visits,
        opening_spend,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let config = AppConfig::load()?;
    let (service, outbox) = build_service(&config);

    let customer = service.register(NewCustomer {
        name: "Simulated guest".to_string(),
        email: None,
        phone: None,
        custom_discount_percent: None,
        opening_visit_count: opening_visits,
        opening_total_spent: opening_spend,
    })?;

    println!("Loyalty simulation for {} visits (evaluated {})", visits.len(), today);
    replay_visits(&service, customer.id(), &visits, today)?;

    let view = service.summary(customer.id(), today)?;
    render_summary(&view);
    println!("Notifications queued: {}", outbox.sent().len());
    Ok(())
}

pub(crate) fn run_permission_resolution(args: ResolveArgs) -> Result<(), AppError> {
    let decision = PermissionResolver::new().explain(
        &args.employee_email,
        &args.restaurant_email,
        &args.role,
    );
    render_decision(&args.employee_email, &args.role, &decision);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        today,
        skip_permissions,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let config = AppConfig::load()?;
    let (service, outbox) = build_service(&config);

    println!("Restaurant back-office demo (evaluated {})", today);
    println!(
        "Milestone: one free meal worth {:.2} every {} visits, valid {} days",
        config.loyalty.milestone_reward_value,
        config.loyalty.milestone_interval,
        config.loyalty.milestone_expiry_days
    );

    let customer = service.register(NewCustomer {
        name: "Rosa Martínez".to_string(),
        email: Some("rosa@example.com".to_string()),
        phone: None,
        custom_discount_percent: Some(5.0),
        opening_visit_count: 0,
        opening_total_spent: 0.0,
    })?;
    println!("\nRegistered {} as {}", customer.name, customer.id());

    let season = [
        38.0, 52.5, 41.0, 75.0, 63.0, 48.5, 90.0, 57.0, 66.0, 120.0, 45.0, 82.0,
    ];
    replay_visits(&service, customer.id(), &season, today)?;

    let view = service.summary(customer.id(), today)?;
    if let Some(reward) = view.available_rewards().next() {
        let updated = service.redeem_reward(customer.id(), &reward.id, today)?;
        println!(
            "\nRedeemed {} ({}); {} rewards remain on file",
            reward.id,
            reward.description,
            updated.rewards().len()
        );
    }

    let later = today + Duration::days(i64::from(config.loyalty.milestone_expiry_days) + 1);
    let expired = service.expire_rewards(customer.id(), later)?;
    println!("Expiry sweep on {}: {} reward(s) lapsed", later, expired);

    render_summary(&service.summary(customer.id(), today)?);

    let sent = outbox.sent();
    if sent.is_empty() {
        println!("Notifications: none dispatched");
    } else {
        println!("Notifications:");
        for notification in sent {
            println!(
                "  - template={} -> {}",
                notification.template, notification.customer_id
            );
        }
    }

    if skip_permissions {
        return Ok(());
    }

    println!("\nStaff permission resolution");
    let resolver = PermissionResolver::new();
    let staff = [
        ("carlos@lacasona.mx", "Propietario"),
        ("lucia@lacasona.com", "Gerente general"),
        ("diego@gmail.com", "Cocinero"),
        ("marta@outlook.com", "Cajera"),
        ("pablo@yahoo.com", "Lavaplatos"),
    ];
    for (email, role) in staff {
        let decision = resolver.explain(email, "contacto@lacasona.mx", role);
        render_decision(email, role, &decision);
    }

    Ok(())
}

fn build_service(config: &AppConfig) -> (DemoService, Arc<InMemoryNotificationOutbox>) {
    let outbox = Arc::new(InMemoryNotificationOutbox::default());
    let service = LoyaltyService::new(
        Arc::new(InMemoryCustomerRepository::default()),
        outbox.clone(),
        config.loyalty.clone(),
    );
    (service, outbox)
}

/// Records one visit per amount, spaced a week apart and ending on `today`.
fn replay_visits(
    service: &DemoService,
    customer_id: &CustomerId,
    amounts: &[f64],
    today: NaiveDate,
) -> Result<(), AppError> {
    let dinner = NaiveTime::from_hms_opt(20, 30, 0).unwrap_or_default();
    let weeks = amounts.len() as i64;

    for (index, amount) in amounts.iter().enumerate() {
        let date = today - Duration::weeks(weeks - 1 - index as i64);
        let visit = Visit {
            id: VisitId(format!("{customer_id}-visit-{}", index + 1)),
            date,
            time: dinner,
            amount: *amount,
            party_size: 2,
            table_number: (index % 12) as u32 + 1,
            payment_method: PaymentMethod::Card,
            tip: None,
            notes: None,
        };

        let receipt = service.record_visit(customer_id, visit, today)?;
        print!(
            "- {} | {:>8.2} | visit #{} | {}",
            date,
            amount,
            receipt.customer.visit_count(),
            receipt.customer.tier()
        );
        if receipt.tier_changed() {
            print!(" (up from {})", receipt.previous_tier);
        }
        if let Some(reward) = &receipt.issued_reward {
            print!(" | earned {} until {}", reward.description, reward.expiration_date);
        }
        println!();
    }

    Ok(())
}

fn render_summary(view: &CustomerLoyaltyView) {
    println!("\nCustomer summary: {} ({})", view.name, view.customer_id);
    println!(
        "- Tier {} | {} visits | {:.2} spent",
        view.tier_label, view.visit_count, view.total_spent
    );
    match view.next_tier {
        Some(next) => println!(
            "- {:.0}% of the way to {}",
            view.progress_to_next_tier, next
        ),
        None => println!("- Top tier reached"),
    }
    println!(
        "- Next free meal in {} visit(s) ({:.0}% there)",
        view.next_reward.visits_remaining, view.next_reward.percent
    );
    if view.rewards.is_empty() {
        println!("- Rewards: none");
    } else {
        println!("- Rewards:");
        for reward in &view.rewards {
            println!(
                "    - {} | {} | {:.2} | expires {} | {}",
                reward.id, reward.description, reward.value, reward.expiration_date, reward.status
            );
        }
    }
}

fn render_decision(email: &str, role: &str, decision: &PermissionDecision) {
    let granted = decision.capabilities.granted();
    println!(
        "- {} [{}]: similarity {:?}, basis {:?} -> {}",
        email,
        if role.is_empty() { "no role" } else { role },
        decision.similarity,
        decision.basis,
        if granted.is_empty() {
            "no access".to_string()
        } else {
            granted.join(", ")
        }
    );
}
