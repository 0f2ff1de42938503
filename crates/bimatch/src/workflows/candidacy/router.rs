use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, ApplicationSubmission, ProfessionalId};
use super::interview::{InterviewProposal, InterviewReply, RescheduleRequest};
use super::repository::ApplicationRepository;
use super::service::{CandidacyError, CandidacyService, TransitionReceipt};
use super::transitions::TransitionViolation;
use crate::workflows::directory::ProjectDirectory;
use crate::workflows::notifications::{NotificationId, NotificationRepository, UserId};

/// Router builder exposing the candidacy lifecycle over HTTP.
pub fn candidacy_router<R, N, P>(service: Arc<CandidacyService<R, N, P>>) -> Router
where
    R: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
{
    Router::new()
        .route("/api/v1/candidacies", post(submit_handler::<R, N, P>))
        .route(
            "/api/v1/candidacies/:application_id",
            get(view_handler::<R, N, P>).delete(withdraw_handler::<R, N, P>),
        )
        .route(
            "/api/v1/candidacies/:application_id/review",
            post(review_handler::<R, N, P>),
        )
        .route(
            "/api/v1/candidacies/:application_id/preselect",
            post(preselect_handler::<R, N, P>),
        )
        .route(
            "/api/v1/candidacies/:application_id/accept",
            post(accept_handler::<R, N, P>),
        )
        .route(
            "/api/v1/candidacies/:application_id/reject",
            post(reject_handler::<R, N, P>),
        )
        .route(
            "/api/v1/candidacies/:application_id/interview/propose",
            post(propose_interview_handler::<R, N, P>),
        )
        .route(
            "/api/v1/candidacies/:application_id/interview/accept",
            post(accept_interview_handler::<R, N, P>),
        )
        .route(
            "/api/v1/candidacies/:application_id/interview/decline",
            post(decline_interview_handler::<R, N, P>),
        )
        .route(
            "/api/v1/candidacies/:application_id/interview/reschedule",
            post(reschedule_interview_handler::<R, N, P>),
        )
        .route(
            "/api/v1/notifications/:user_id",
            get(feed_handler::<R, N, P>),
        )
        .route(
            "/api/v1/notifications/:notification_id/read",
            post(mark_read_handler::<R, N, P>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReasonBody {
    pub(crate) reason: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WithdrawBody {
    pub(crate) professional_id: String,
}

pub(crate) fn error_response(error: CandidacyError) -> Response {
    let status = match &error {
        CandidacyError::Transition(TransitionViolation::IllegalTarget { .. }) => {
            StatusCode::CONFLICT
        }
        CandidacyError::Transition(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CandidacyError::StaleState { .. }
        | CandidacyError::DuplicateApplication
        | CandidacyError::RejectedApplicationExists
        | CandidacyError::WithdrawalNotPermitted { .. } => StatusCode::CONFLICT,
        CandidacyError::ApplicationNotFound(_) | CandidacyError::ProjectNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        CandidacyError::NotOwner => StatusCode::FORBIDDEN,
        CandidacyError::Repository(_)
        | CandidacyError::Directory(_)
        | CandidacyError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = Json(json!({ "error": error.to_string() }));
    (status, body).into_response()
}

fn receipt_response(status: StatusCode, receipt: TransitionReceipt) -> Response {
    let view = receipt.application.status_view();
    let payload = json!({
        "application_id": view.application_id.0,
        "status": view.status,
        "updated_at": view.updated_at,
        "notification_delivered": receipt.notification.is_delivered(),
    });
    (status, Json(payload)).into_response()
}

pub(crate) async fn submit_handler<R, N, P>(
    State(service): State<Arc<CandidacyService<R, N, P>>>,
    Json(submission): Json<ApplicationSubmission>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
{
    match service.submit(submission) {
        Ok(receipt) => receipt_response(StatusCode::CREATED, receipt),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn view_handler<R, N, P>(
    State(service): State<Arc<CandidacyService<R, N, P>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn withdraw_handler<R, N, P>(
    State(service): State<Arc<CandidacyService<R, N, P>>>,
    Path(application_id): Path<String>,
    Json(body): Json<WithdrawBody>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
{
    match service.withdraw(
        &ApplicationId(application_id),
        &ProfessionalId(body.professional_id),
    ) {
        Ok(application) => {
            let payload = json!({
                "application_id": application.id.0,
                "withdrawn": true,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<R, N, P>(
    State(service): State<Arc<CandidacyService<R, N, P>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
{
    match service.review(&ApplicationId(application_id)) {
        Ok(receipt) => receipt_response(StatusCode::OK, receipt),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn preselect_handler<R, N, P>(
    State(service): State<Arc<CandidacyService<R, N, P>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
{
    match service.preselect(&ApplicationId(application_id)) {
        Ok(receipt) => receipt_response(StatusCode::OK, receipt),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn accept_handler<R, N, P>(
    State(service): State<Arc<CandidacyService<R, N, P>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
{
    match service.accept(&ApplicationId(application_id)) {
        Ok(receipt) => receipt_response(StatusCode::OK, receipt),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<R, N, P>(
    State(service): State<Arc<CandidacyService<R, N, P>>>,
    Path(application_id): Path<String>,
    Json(body): Json<ReasonBody>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
{
    match service.reject(&ApplicationId(application_id), &body.reason) {
        Ok(receipt) => receipt_response(StatusCode::OK, receipt),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn propose_interview_handler<R, N, P>(
    State(service): State<Arc<CandidacyService<R, N, P>>>,
    Path(application_id): Path<String>,
    Json(proposal): Json<InterviewProposal>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
{
    match service.propose_interview(&ApplicationId(application_id), proposal) {
        Ok(receipt) => receipt_response(StatusCode::OK, receipt),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn accept_interview_handler<R, N, P>(
    State(service): State<Arc<CandidacyService<R, N, P>>>,
    Path(application_id): Path<String>,
    Json(reply): Json<InterviewReply>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
{
    match service.accept_interview(&ApplicationId(application_id), reply) {
        Ok(receipt) => receipt_response(StatusCode::OK, receipt),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decline_interview_handler<R, N, P>(
    State(service): State<Arc<CandidacyService<R, N, P>>>,
    Path(application_id): Path<String>,
    Json(body): Json<ReasonBody>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
{
    match service.decline_interview(&ApplicationId(application_id), &body.reason) {
        Ok(receipt) => receipt_response(StatusCode::OK, receipt),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reschedule_interview_handler<R, N, P>(
    State(service): State<Arc<CandidacyService<R, N, P>>>,
    Path(application_id): Path<String>,
    Json(request): Json<RescheduleRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
{
    match service.reschedule_interview(&ApplicationId(application_id), request) {
        Ok(receipt) => receipt_response(StatusCode::OK, receipt),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn feed_handler<R, N, P>(
    State(service): State<Arc<CandidacyService<R, N, P>>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
{
    match service.feed(&UserId(user_id)) {
        Ok(notifications) => (StatusCode::OK, Json(notifications)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn mark_read_handler<R, N, P>(
    State(service): State<Arc<CandidacyService<R, N, P>>>,
    Path(notification_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
{
    match service.mark_notification_read(&NotificationId(notification_id)) {
        Ok(notification) => (StatusCode::OK, Json(notification)).into_response(),
        Err(error) => error_response(error),
    }
}
