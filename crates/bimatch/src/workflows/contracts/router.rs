use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{Contract, ContractId};
use super::draft::DraftOverrides;
use super::generator::TextGenerator;
use super::repository::ContractRepository;
use super::service::{ContractError, ContractReceipt, ContractService, SendRecipients};
use crate::workflows::candidacy::domain::ApplicationId;
use crate::workflows::candidacy::repository::ApplicationRepository;
use crate::workflows::directory::ProjectDirectory;
use crate::workflows::notifications::NotificationRepository;

/// Router builder exposing the admin contract pipeline over HTTP.
pub fn contract_router<C, A, N, P, G>(service: Arc<ContractService<C, A, N, P, G>>) -> Router
where
    C: ContractRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
    G: TextGenerator + 'static,
{
    Router::new()
        .route("/api/v1/contracts", post(create_draft_handler::<C, A, N, P, G>))
        .route(
            "/api/v1/contracts/:contract_id",
            get(view_handler::<C, A, N, P, G>),
        )
        .route(
            "/api/v1/contracts/:contract_id/generate",
            post(generate_handler::<C, A, N, P, G>),
        )
        .route(
            "/api/v1/contracts/:contract_id/text",
            put(edit_text_handler::<C, A, N, P, G>),
        )
        .route(
            "/api/v1/contracts/:contract_id/revalidate",
            post(revalidate_handler::<C, A, N, P, G>),
        )
        .route(
            "/api/v1/contracts/:contract_id/send",
            post(send_handler::<C, A, N, P, G>),
        )
        .route(
            "/api/v1/contracts/:contract_id/approve",
            post(approve_handler::<C, A, N, P, G>),
        )
        .route(
            "/api/v1/contracts/:contract_id/reject",
            post(reject_handler::<C, A, N, P, G>),
        )
        .route(
            "/api/v1/contracts/:contract_id/archive",
            post(archive_handler::<C, A, N, P, G>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateDraftBody {
    pub(crate) application_id: String,
    #[serde(default)]
    pub(crate) overrides: DraftOverrides,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EditTextBody {
    pub(crate) text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendBody {
    pub(crate) to: SendRecipients,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DecisionBody {
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

pub(crate) fn error_response(error: ContractError) -> Response {
    let status = match &error {
        ContractError::Review(_)
        | ContractError::TextFrozen { .. }
        | ContractError::StaleState { .. }
        | ContractError::DuplicateContract(_)
        | ContractError::IneligibleApplication { .. } => StatusCode::CONFLICT,
        ContractError::MissingField(_)
        | ContractError::IncompleteDocument(_)
        | ContractError::MissingText => StatusCode::UNPROCESSABLE_ENTITY,
        ContractError::ContractNotFound(_)
        | ContractError::ApplicationNotFound(_)
        | ContractError::ProfessionalNotFound(_)
        | ContractError::CompanyNotFound(_)
        | ContractError::ProjectNotFound(_) => StatusCode::NOT_FOUND,
        ContractError::Generation(_) => StatusCode::BAD_GATEWAY,
        ContractError::Repository(_)
        | ContractError::Applications(_)
        | ContractError::Directory(_)
        | ContractError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = Json(json!({ "error": error.to_string() }));
    (status, body).into_response()
}

fn contract_response(status: StatusCode, contract: Contract) -> Response {
    (status, Json(contract.status_view())).into_response()
}

fn receipt_response(receipt: ContractReceipt) -> Response {
    let delivered = receipt
        .notifications
        .iter()
        .filter(|delivery| delivery.is_delivered())
        .count();
    let failed = receipt.notifications.len() - delivered;
    let view = receipt.contract.status_view();
    let payload = json!({
        "contract_id": view.contract_id.0,
        "status": view.status,
        "updated_at": view.updated_at,
        "notifications_delivered": delivered,
        "notifications_failed": failed,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn create_draft_handler<C, A, N, P, G>(
    State(service): State<Arc<ContractService<C, A, N, P, G>>>,
    Json(body): Json<CreateDraftBody>,
) -> Response
where
    C: ContractRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
    G: TextGenerator + 'static,
{
    match service.create_draft(&ApplicationId(body.application_id), body.overrides) {
        Ok(contract) => contract_response(StatusCode::CREATED, contract),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn view_handler<C, A, N, P, G>(
    State(service): State<Arc<ContractService<C, A, N, P, G>>>,
    Path(contract_id): Path<String>,
) -> Response
where
    C: ContractRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
    G: TextGenerator + 'static,
{
    match service.get(&ContractId(contract_id)) {
        Ok(contract) => (StatusCode::OK, Json(contract)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn generate_handler<C, A, N, P, G>(
    State(service): State<Arc<ContractService<C, A, N, P, G>>>,
    Path(contract_id): Path<String>,
) -> Response
where
    C: ContractRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
    G: TextGenerator + 'static,
{
    match service.generate(&ContractId(contract_id)) {
        Ok(contract) => contract_response(StatusCode::OK, contract),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn edit_text_handler<C, A, N, P, G>(
    State(service): State<Arc<ContractService<C, A, N, P, G>>>,
    Path(contract_id): Path<String>,
    Json(body): Json<EditTextBody>,
) -> Response
where
    C: ContractRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
    G: TextGenerator + 'static,
{
    match service.edit_text(&ContractId(contract_id), body.text) {
        Ok(contract) => contract_response(StatusCode::OK, contract),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn revalidate_handler<C, A, N, P, G>(
    State(service): State<Arc<ContractService<C, A, N, P, G>>>,
    Path(contract_id): Path<String>,
) -> Response
where
    C: ContractRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
    G: TextGenerator + 'static,
{
    match service.revalidate(&ContractId(contract_id)) {
        Ok(contract) => contract_response(StatusCode::OK, contract),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn send_handler<C, A, N, P, G>(
    State(service): State<Arc<ContractService<C, A, N, P, G>>>,
    Path(contract_id): Path<String>,
    Json(body): Json<SendBody>,
) -> Response
where
    C: ContractRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
    G: TextGenerator + 'static,
{
    match service.send_to_parties(&ContractId(contract_id), body.to) {
        Ok(receipt) => receipt_response(receipt),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<C, A, N, P, G>(
    State(service): State<Arc<ContractService<C, A, N, P, G>>>,
    Path(contract_id): Path<String>,
    Json(body): Json<DecisionBody>,
) -> Response
where
    C: ContractRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
    G: TextGenerator + 'static,
{
    match service.approve(&ContractId(contract_id), body.notes) {
        Ok(receipt) => receipt_response(receipt),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<C, A, N, P, G>(
    State(service): State<Arc<ContractService<C, A, N, P, G>>>,
    Path(contract_id): Path<String>,
    Json(body): Json<DecisionBody>,
) -> Response
where
    C: ContractRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
    G: TextGenerator + 'static,
{
    match service.reject(&ContractId(contract_id), body.notes) {
        Ok(receipt) => receipt_response(receipt),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn archive_handler<C, A, N, P, G>(
    State(service): State<Arc<ContractService<C, A, N, P, G>>>,
    Path(contract_id): Path<String>,
) -> Response
where
    C: ContractRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
    G: TextGenerator + 'static,
{
    match service.archive(&ContractId(contract_id)) {
        Ok(contract) => contract_response(StatusCode::OK, contract),
        Err(error) => error_response(error),
    }
}
