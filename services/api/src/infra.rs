use backoffice::loyalty::{
    Customer, CustomerId, CustomerRepository, LoyaltyNotification, NotificationError,
    NotificationPublisher, RepositoryError, Visit, VisitId,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct CustomerTables {
    customers: HashMap<CustomerId, Customer>,
    visits: HashMap<CustomerId, Vec<Visit>>,
    visit_ids: HashSet<VisitId>,
}

/// Process-local customer store backing the HTTP service and CLI demos.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCustomerRepository {
    tables: Arc<Mutex<CustomerTables>>,
}

impl InMemoryCustomerRepository {
    fn tables(&self) -> Result<MutexGuard<'_, CustomerTables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("customer store lock poisoned".to_string()))
    }
}

impl CustomerRepository for InMemoryCustomerRepository {
    fn insert(&self, customer: Customer) -> Result<Customer, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.customers.contains_key(customer.id()) {
            return Err(RepositoryError::Conflict);
        }
        tables
            .customers
            .insert(customer.id().clone(), customer.clone());
        Ok(customer)
    }

    fn update(&self, customer: Customer) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        match tables.customers.get_mut(customer.id()) {
            Some(slot) => {
                *slot = customer;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.tables()?.customers.get(id).cloned())
    }

    fn save_visit(&self, customer: Customer, visit: Visit) -> Result<(), RepositoryError> {
        let mut tables = self.tables()?;
        if tables.visit_ids.contains(&visit.id) {
            return Err(RepositoryError::Conflict);
        }
        if !tables.customers.contains_key(customer.id()) {
            return Err(RepositoryError::NotFound);
        }

        tables.visit_ids.insert(visit.id.clone());
        tables
            .visits
            .entry(customer.id().clone())
            .or_default()
            .push(visit);
        tables.customers.insert(customer.id().clone(), customer);
        Ok(())
    }

    fn visits(&self, customer_id: &CustomerId) -> Result<Vec<Visit>, RepositoryError> {
        Ok(self
            .tables()?
            .visits
            .get(customer_id)
            .cloned()
            .unwrap_or_default())
    }

    fn contains_visit(&self, visit_id: &VisitId) -> Result<bool, RepositoryError> {
        Ok(self.tables()?.visit_ids.contains(visit_id))
    }
}

/// Notification sink that logs and keeps every message for later inspection.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationOutbox {
    sent: Arc<Mutex<Vec<LoyaltyNotification>>>,
}

impl NotificationPublisher for InMemoryNotificationOutbox {
    fn publish(&self, notification: LoyaltyNotification) -> Result<(), NotificationError> {
        info!(
            template = %notification.template,
            customer_id = %notification.customer_id,
            "loyalty notification queued"
        );
        self.sent
            .lock()
            .map_err(|_| NotificationError::Transport("outbox lock poisoned".to_string()))?
            .push(notification);
        Ok(())
    }
}

impl InMemoryNotificationOutbox {
    pub(crate) fn sent(&self) -> Vec<LoyaltyNotification> {
        self.sent
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
