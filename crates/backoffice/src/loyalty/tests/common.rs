use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use crate::loyalty::domain::{Customer, CustomerId, PaymentMethod, Visit, VisitId};
use crate::loyalty::repository::{
    CustomerRepository, LoyaltyNotification, NotificationError, NotificationPublisher,
    RepositoryError,
};
use crate::loyalty::{loyalty_router, LoyaltyConfig, LoyaltyService, NewCustomer};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
}

pub(super) fn visit(id: &str, amount: f64) -> Visit {
    Visit {
        id: VisitId(id.to_string()),
        date: today(),
        time: NaiveTime::from_hms_opt(19, 30, 0).expect("valid time"),
        amount,
        party_size: 2,
        table_number: 7,
        payment_method: PaymentMethod::Card,
        tip: Some(5.0),
        notes: None,
    }
}

pub(super) fn customer_at(visit_count: u32, total_spent: f64) -> Customer {
    Customer::with_history(
        CustomerId("cus-test".to_string()),
        "Lucia Ferrer",
        visit_count,
        total_spent,
    )
}

pub(super) fn new_customer(name: &str) -> NewCustomer {
    NewCustomer {
        name: name.to_string(),
        email: Some("lucia@example.com".to_string()),
        phone: None,
        custom_discount_percent: None,
        opening_visit_count: 0,
        opening_total_spent: 0.0,
    }
}

pub(super) fn build_service() -> (
    LoyaltyService<MemoryRepository, MemoryNotifications>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifications>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service = LoyaltyService::new(
        repository.clone(),
        notifications.clone(),
        LoyaltyConfig::default(),
    );
    (service, repository, notifications)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    customers: Arc<Mutex<HashMap<CustomerId, Customer>>>,
    visits: Arc<Mutex<Vec<(CustomerId, Visit)>>>,
}

impl CustomerRepository for MemoryRepository {
    fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let mut guard = self.customers.lock().expect("repository mutex poisoned");
        if guard.contains_key(customer.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(customer.id().clone(), customer.clone());
        Ok(customer)
    }

    fn update(&self, customer: Customer) -> Result<(), RepositoryError> {
        let mut guard = self.customers.lock().expect("repository mutex poisoned");
        guard.insert(customer.id().clone(), customer);
        Ok(())
    }

    fn fetch(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let guard = self.customers.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn save_visit(&self, customer: Customer, visit: Visit) -> Result<(), RepositoryError> {
        let mut customers = self.customers.lock().expect("repository mutex poisoned");
        let mut visits = self.visits.lock().expect("repository mutex poisoned");
        if visits.iter().any(|(_, stored)| stored.id == visit.id) {
            return Err(RepositoryError::Conflict);
        }
        visits.push((customer.id().clone(), visit));
        customers.insert(customer.id().clone(), customer);
        Ok(())
    }

    fn visits(&self, customer_id: &CustomerId) -> Result<Vec<Visit>, RepositoryError> {
        let guard = self.visits.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|(owner, _)| owner == customer_id)
            .map(|(_, visit)| visit.clone())
            .collect())
    }

    fn contains_visit(&self, visit_id: &VisitId) -> Result<bool, RepositoryError> {
        let guard = self.visits.lock().expect("repository mutex poisoned");
        Ok(guard.iter().any(|(_, visit)| &visit.id == visit_id))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    events: Arc<Mutex<Vec<LoyaltyNotification>>>,
}

impl MemoryNotifications {
    pub(super) fn events(&self) -> Vec<LoyaltyNotification> {
        self.events.lock().expect("notification mutex poisoned").clone()
    }
}

impl NotificationPublisher for MemoryNotifications {
    fn publish(&self, notification: LoyaltyNotification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct OfflineNotifications;

impl NotificationPublisher for OfflineNotifications {
    fn publish(&self, _notification: LoyaltyNotification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp offline".to_string()))
    }
}

/// Wraps a [`MemoryRepository`] and fails the next `failures` visit writes.
pub(super) struct FlakyRepository {
    pub(super) inner: MemoryRepository,
    failures: Mutex<u32>,
}

impl FlakyRepository {
    pub(super) fn failing(failures: u32) -> Self {
        Self {
            inner: MemoryRepository::default(),
            failures: Mutex::new(failures),
        }
    }
}

impl CustomerRepository for FlakyRepository {
    fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        self.inner.insert(customer)
    }

    fn update(&self, customer: Customer) -> Result<(), RepositoryError> {
        self.inner.update(customer)
    }

    fn fetch(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn save_visit(&self, customer: Customer, visit: Visit) -> Result<(), RepositoryError> {
        let mut failures = self.failures.lock().expect("failure counter poisoned");
        if *failures > 0 {
            *failures -= 1;
            return Err(RepositoryError::Unavailable("write timed out".to_string()));
        }
        drop(failures);
        self.inner.save_visit(customer, visit)
    }

    fn visits(&self, customer_id: &CustomerId) -> Result<Vec<Visit>, RepositoryError> {
        self.inner.visits(customer_id)
    }

    fn contains_visit(&self, visit_id: &VisitId) -> Result<bool, RepositoryError> {
        self.inner.contains_visit(visit_id)
    }
}

pub(super) struct UnavailableRepository;

impl CustomerRepository for UnavailableRepository {
    fn insert(&self, _customer: Customer) -> Result<Customer, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _customer: Customer) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save_visit(&self, _customer: Customer, _visit: Visit) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn visits(&self, _customer_id: &CustomerId) -> Result<Vec<Visit>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn contains_visit(&self, _visit_id: &VisitId) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: LoyaltyService<MemoryRepository, MemoryNotifications>,
) -> axum::Router {
    loyalty_router(Arc::new(service))
}
