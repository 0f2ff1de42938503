use crate::infra::{
    AppState, CannedTextGenerator, InMemoryApplicationRepository, InMemoryContractRepository,
    InMemoryNotificationRepository, SeedDirectory,
};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use bimatch::workflows::candidacy::{candidacy_router, CandidacyService};
use bimatch::workflows::contracts::{contract_router, ContractService};

pub(crate) type AppCandidacyService = CandidacyService<
    InMemoryApplicationRepository,
    InMemoryNotificationRepository,
    SeedDirectory,
>;

pub(crate) type AppContractService = ContractService<
    InMemoryContractRepository,
    InMemoryApplicationRepository,
    InMemoryNotificationRepository,
    SeedDirectory,
    CannedTextGenerator,
>;

pub(crate) fn with_workflow_routes(
    candidacy: Arc<AppCandidacyService>,
    contracts: Arc<AppContractService>,
) -> axum::Router {
    candidacy_router(candidacy)
        .merge(contract_router(contracts))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
