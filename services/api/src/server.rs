use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryCustomerRepository, InMemoryNotificationOutbox};
use crate::routes::with_backoffice_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use backoffice::config::AppConfig;
use backoffice::error::AppError;
use backoffice::loyalty::LoyaltyService;
use backoffice::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let loyalty_service = Arc::new(LoyaltyService::new(
        Arc::new(InMemoryCustomerRepository::default()),
        Arc::new(InMemoryNotificationOutbox::default()),
        config.loyalty.clone(),
    ));

    let app = with_backoffice_routes(loyalty_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        milestone_interval = config.loyalty.milestone_interval,
        "restaurant back-office service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
