use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CustomerId, ManualReward, NewCustomer, RewardId, Visit};
use super::engine::LoyaltyError;
use super::repository::{CustomerRepository, NotificationPublisher, RepositoryError};
use super::service::{LoyaltyService, LoyaltyServiceError};

#[derive(Debug, Deserialize)]
pub struct RecordVisitRequest {
    pub visit: Visit,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct IssueRewardRequest {
    pub reward: ManualReward,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RedeemRewardRequest {
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

/// Router builder exposing the loyalty card endpoints.
pub fn loyalty_router<R, N>(service: Arc<LoyaltyService<R, N>>) -> Router
where
    R: CustomerRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/loyalty/customers", post(register_handler::<R, N>))
        .route(
            "/api/v1/loyalty/customers/:customer_id",
            get(summary_handler::<R, N>),
        )
        .route(
            "/api/v1/loyalty/customers/:customer_id/visits",
            post(record_visit_handler::<R, N>).get(visit_history_handler::<R, N>),
        )
        .route(
            "/api/v1/loyalty/customers/:customer_id/rewards",
            post(issue_reward_handler::<R, N>),
        )
        .route(
            "/api/v1/loyalty/customers/:customer_id/rewards/:reward_id/redeem",
            post(redeem_reward_handler::<R, N>),
        )
        .with_state(service)
}

fn today_or_local(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

pub(crate) async fn register_handler<R, N>(
    State(service): State<Arc<LoyaltyService<R, N>>>,
    axum::Json(request): axum::Json<NewCustomer>,
) -> Response
where
    R: CustomerRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.register(request) {
        Ok(customer) => (StatusCode::CREATED, axum::Json(customer)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn summary_handler<R, N>(
    State(service): State<Arc<LoyaltyService<R, N>>>,
    Path(customer_id): Path<String>,
) -> Response
where
    R: CustomerRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let id = CustomerId(customer_id);
    match service.summary(&id, today_or_local(None)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn record_visit_handler<R, N>(
    State(service): State<Arc<LoyaltyService<R, N>>>,
    Path(customer_id): Path<String>,
    axum::Json(request): axum::Json<RecordVisitRequest>,
) -> Response
where
    R: CustomerRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let id = CustomerId(customer_id);
    let today = today_or_local(request.today);
    match service.record_visit(&id, request.visit, today) {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn visit_history_handler<R, N>(
    State(service): State<Arc<LoyaltyService<R, N>>>,
    Path(customer_id): Path<String>,
) -> Response
where
    R: CustomerRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let id = CustomerId(customer_id);
    match service.visit_history(&id) {
        Ok(visits) => (StatusCode::OK, axum::Json(visits)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn issue_reward_handler<R, N>(
    State(service): State<Arc<LoyaltyService<R, N>>>,
    Path(customer_id): Path<String>,
    axum::Json(request): axum::Json<IssueRewardRequest>,
) -> Response
where
    R: CustomerRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let id = CustomerId(customer_id);
    let today = today_or_local(request.today);
    match service.issue_reward(&id, request.reward, today) {
        Ok(customer) => (StatusCode::CREATED, axum::Json(customer)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn redeem_reward_handler<R, N>(
    State(service): State<Arc<LoyaltyService<R, N>>>,
    Path((customer_id, reward_id)): Path<(String, String)>,
    axum::Json(request): axum::Json<RedeemRewardRequest>,
) -> Response
where
    R: CustomerRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let id = CustomerId(customer_id);
    let reward_id = RewardId(reward_id);
    let today = today_or_local(request.today);
    match service.redeem_reward(&id, &reward_id, today) {
        Ok(customer) => (StatusCode::OK, axum::Json(customer)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) fn status_for(error: &LoyaltyServiceError) -> StatusCode {
    match error {
        LoyaltyServiceError::Loyalty(LoyaltyError::Validation(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LoyaltyServiceError::Loyalty(LoyaltyError::RewardNotFound(_))
        | LoyaltyServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        LoyaltyServiceError::Loyalty(LoyaltyError::InvalidState { .. })
        | LoyaltyServiceError::Repository(RepositoryError::Conflict)
        | LoyaltyServiceError::DuplicateVisit(_) => StatusCode::CONFLICT,
        LoyaltyServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: LoyaltyServiceError) -> Response {
    let status = status_for(&error);
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
