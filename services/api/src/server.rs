use crate::cli::ServeArgs;
use crate::infra::{
    AppState, CannedTextGenerator, InMemoryApplicationRepository, InMemoryContractRepository,
    InMemoryNotificationRepository, SeedDirectory,
};
use crate::routes::with_workflow_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use bimatch::config::AppConfig;
use bimatch::error::AppError;
use bimatch::telemetry;
use bimatch::workflows::candidacy::CandidacyService;
use bimatch::workflows::contracts::ContractService;
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

    let applications = Arc::new(InMemoryApplicationRepository::default());
    let notifications = Arc::new(InMemoryNotificationRepository::default());
    let directory = Arc::new(SeedDirectory::default());

    let candidacy_service = Arc::new(CandidacyService::new(
        applications.clone(),
        notifications.clone(),
        directory.clone(),
    ));
    let contract_service = Arc::new(ContractService::new(
        Arc::new(InMemoryContractRepository::default()),
        applications,
        notifications,
        directory,
        Arc::new(CannedTextGenerator),
        config.generator.clone(),
    ));

    let app = with_workflow_routes(candidacy_service, contract_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "candidacy and contract workflow engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
