use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::domain::{
    ApplicationId, ApplicationStatus, ApplicationSubmission, ProfessionalId, ProjectApplication,
    ProjectId,
};
use super::interview::{self, InterviewProposal, InterviewReply, RescheduleRequest};
use super::repository::{ApplicationRepository, RepositoryError};
use super::transitions::{self, TransitionViolation};
use crate::workflows::directory::{DirectoryError, ProjectDirectory, ProjectSnapshot};
use crate::workflows::notifications::{
    NoticeRequest, NotificationDelivery, NotificationDispatcher, NotificationError, NotificationId,
    NotificationKind, NotificationPayload, NotificationRepository, UserId, UserNotification,
};

/// Result of a successful transition: the updated application plus the
/// delivery report for the single notice addressed to the counterparty.
///
/// The status write and the notice are two independent writes. When the
/// notice fails the transition still stands; the receipt carries the
/// undelivered request so the caller can hand it back to
/// [`CandidacyService::retry_notification`].
#[derive(Debug)]
pub struct TransitionReceipt {
    pub application: ProjectApplication,
    pub notification: NotificationDelivery,
}

/// Error raised by the candidacy engine.
#[derive(Debug, thiserror::Error)]
pub enum CandidacyError {
    #[error(transparent)]
    Transition(#[from] TransitionViolation),
    #[error("application status changed before the write (expected '{expected}', found '{found}')")]
    StaleState {
        expected: ApplicationStatus,
        found: ApplicationStatus,
    },
    #[error("application '{0}' not found")]
    ApplicationNotFound(ApplicationId),
    #[error("project '{0}' not found")]
    ProjectNotFound(ProjectId),
    #[error("an application for this project is already on file")]
    DuplicateApplication,
    #[error("a rejected application for this project cannot be resubmitted")]
    RejectedApplicationExists,
    #[error("withdrawal is not permitted once an application is '{status}'")]
    WithdrawalNotPermitted { status: ApplicationStatus },
    #[error("operation reserved to the application owner")]
    NotOwner,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

static CANDIDACY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = CANDIDACY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("cand-{id:06}"))
}

fn base_payload(application: &ProjectApplication, project: &ProjectSnapshot) -> NotificationPayload {
    NotificationPayload {
        application_id: Some(application.id.0.clone()),
        related_entity_id: Some(project.id.0.clone()),
        project_title: Some(project.title.clone()),
        ..Default::default()
    }
}

fn professional_notice(
    application: &ProjectApplication,
    project: &ProjectSnapshot,
    kind: NotificationKind,
    title: &str,
    message: String,
) -> NoticeRequest {
    NoticeRequest {
        recipient: UserId::from(&application.professional_id),
        kind,
        title: title.to_string(),
        message,
        link_to: format!("/professional/candidature/{}", application.id.0),
        payload: base_payload(application, project),
    }
}

fn company_notice(
    application: &ProjectApplication,
    project: &ProjectSnapshot,
    kind: NotificationKind,
    title: &str,
    message: String,
) -> NoticeRequest {
    NoticeRequest {
        recipient: UserId::from(&application.company_id),
        kind,
        title: title.to_string(),
        message,
        link_to: format!("/company/projects/{}/candidates", project.id.0),
        payload: base_payload(application, project),
    }
}

/// The sole authority for `ProjectApplication` status transitions.
///
/// Every mutation funnels through the transition table and lands via a
/// compare-and-swap on the previously read status, so racing actors get a
/// `StaleState` error instead of silently overwriting each other.
pub struct CandidacyService<R, N, P> {
    repository: Arc<R>,
    dispatcher: NotificationDispatcher<N>,
    directory: Arc<P>,
}

impl<R, N, P> CandidacyService<R, N, P>
where
    R: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
{
    pub fn new(repository: Arc<R>, notifications: Arc<N>, directory: Arc<P>) -> Self {
        Self {
            repository,
            dispatcher: NotificationDispatcher::new(notifications),
            directory,
        }
    }

    /// Submit a new candidacy for a project.
    ///
    /// At most one live application per (project, professional) pair may
    /// exist, and a rejected candidacy blocks resubmission even though
    /// withdrawal would have deleted the document.
    pub fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<TransitionReceipt, CandidacyError> {
        let project = self.load_project(&submission.project_id)?;

        if let Some(existing) = self.repository.find_for_project_and_professional(
            &submission.project_id,
            &submission.professional_id,
        )? {
            return Err(if existing.status == ApplicationStatus::Rifiutata {
                CandidacyError::RejectedApplicationExists
            } else {
                CandidacyError::DuplicateApplication
            });
        }

        let now = Utc::now();
        let application = ProjectApplication {
            id: next_application_id(),
            project_id: submission.project_id,
            professional_id: submission.professional_id,
            company_id: project.company_id.clone(),
            status: ApplicationStatus::Inviata,
            cover_letter_message: submission.cover_letter_message,
            relevant_skills: submission.relevant_skills,
            availability_notes: submission.availability_notes,
            interview_proposal_message: None,
            proposed_interview_date: None,
            professional_response_reason: None,
            professional_new_date_proposal: None,
            rejection_reason: None,
            application_date: now,
            updated_at: now,
        };

        let stored = self.repository.insert(application)?;
        let request = company_notice(
            &stored,
            &project,
            NotificationKind::ApplicationReceived,
            "Nuova candidatura ricevuta",
            format!(
                "Hai ricevuto una nuova candidatura per il progetto \"{}\".",
                project.title
            ),
        );
        Ok(TransitionReceipt {
            application: stored,
            notification: self.dispatcher.dispatch_reported(request),
        })
    }

    /// Company takes the candidacy into review.
    pub fn review(&self, application_id: &ApplicationId) -> Result<TransitionReceipt, CandidacyError> {
        self.transition_with(
            application_id,
            ApplicationStatus::InRevisione,
            |_| Ok(()),
            |application, project| {
                professional_notice(
                    application,
                    project,
                    NotificationKind::ApplicationUnderReview,
                    "Candidatura in revisione",
                    format!(
                        "La tua candidatura per \"{}\" è ora in revisione.",
                        project.title
                    ),
                )
            },
        )
    }

    /// Company preselects the candidacy, opening the interview negotiation.
    pub fn preselect(
        &self,
        application_id: &ApplicationId,
    ) -> Result<TransitionReceipt, CandidacyError> {
        self.transition_with(
            application_id,
            ApplicationStatus::Preselezionata,
            |_| Ok(()),
            |application, project| {
                professional_notice(
                    application,
                    project,
                    NotificationKind::ApplicationPreselected,
                    "Candidatura preselezionata",
                    format!(
                        "La tua candidatura per \"{}\" è stata preselezionata. L'azienda potrà proporti un colloquio.",
                        project.title
                    ),
                )
            },
        )
    }

    /// Company accepts the candidacy.
    pub fn accept(&self, application_id: &ApplicationId) -> Result<TransitionReceipt, CandidacyError> {
        self.transition_with(
            application_id,
            ApplicationStatus::Accettata,
            |_| Ok(()),
            |application, project| {
                professional_notice(
                    application,
                    project,
                    NotificationKind::ApplicationAccepted,
                    "Candidatura accettata",
                    format!(
                        "Congratulazioni! La tua candidatura per \"{}\" è stata accettata.",
                        project.title
                    ),
                )
            },
        )
    }

    /// Company rejects the candidacy. Terminal: nothing moves out of
    /// `rifiutata`, and the professional cannot reapply to the project.
    pub fn reject(
        &self,
        application_id: &ApplicationId,
        reason: &str,
    ) -> Result<TransitionReceipt, CandidacyError> {
        let reason = reason.trim().to_string();
        self.transition_with(
            application_id,
            ApplicationStatus::Rifiutata,
            |application| {
                transitions::require_reason("rejection_reason", &reason)?;
                application.rejection_reason = Some(reason.clone());
                Ok(())
            },
            |application, project| {
                professional_notice(
                    application,
                    project,
                    NotificationKind::ApplicationRejected,
                    "Candidatura rifiutata",
                    format!(
                        "La tua candidatura per \"{}\" non è stata accettata. Motivazione: {}",
                        project.title,
                        application.rejection_reason.as_deref().unwrap_or_default()
                    ),
                )
            },
        )
    }

    /// Company proposes an interview to a preselected professional, or
    /// re-proposes after a reschedule request.
    pub fn propose_interview(
        &self,
        application_id: &ApplicationId,
        proposal: InterviewProposal,
    ) -> Result<TransitionReceipt, CandidacyError> {
        let notice_proposal = proposal.clone();
        self.transition_with(
            application_id,
            ApplicationStatus::ColloquioProposto,
            move |application| {
                transitions::require_field("interview_proposal_message", &proposal.message)?;
                application.interview_proposal_message = Some(proposal.message.clone());
                application.proposed_interview_date = Some(proposal.date);
                // a fresh proposal supersedes any earlier professional response
                application.professional_response_reason = None;
                application.professional_new_date_proposal = None;
                Ok(())
            },
            move |application, project| {
                let mut request = professional_notice(
                    application,
                    project,
                    NotificationKind::InterviewProposed,
                    "Proposta di colloquio",
                    interview::proposal_message(&project.title, &notice_proposal),
                );
                request.payload.response_message = Some(notice_proposal.message.clone());
                request.payload.proposed_date = Some(notice_proposal.date);
                request
            },
        )
    }

    /// Professional accepts the proposed interview, optionally with a
    /// message and a counter-proposed date.
    pub fn accept_interview(
        &self,
        application_id: &ApplicationId,
        reply: InterviewReply,
    ) -> Result<TransitionReceipt, CandidacyError> {
        let notice_reply = reply.clone();
        self.professional_response(
            application_id,
            ApplicationStatus::ColloquioAccettatoProf,
            move |application| {
                application.professional_response_reason = reply
                    .message
                    .as_deref()
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(str::to_string);
                application.professional_new_date_proposal = reply.counter_date;
                Ok(())
            },
            move |application, project| {
                let mut request = company_notice(
                    application,
                    project,
                    NotificationKind::InterviewAccepted,
                    "Colloquio accettato",
                    interview::acceptance_message(&project.title, &notice_reply),
                );
                request.payload.response_message = notice_reply.message.clone();
                request.payload.proposed_date = notice_reply.counter_date;
                request
            },
        )
    }

    /// Professional declines the proposed interview. This is an interview
    /// outcome, not a rejection of the candidacy: the company may still
    /// accept or reject the application afterwards.
    pub fn decline_interview(
        &self,
        application_id: &ApplicationId,
        reason: &str,
    ) -> Result<TransitionReceipt, CandidacyError> {
        let reason = reason.trim().to_string();
        self.professional_response(
            application_id,
            ApplicationStatus::ColloquioRifiutatoProf,
            |application| {
                transitions::require_reason("professional_response_reason", &reason)?;
                application.professional_response_reason = Some(reason.clone());
                Ok(())
            },
            |application, project| {
                let mut request = company_notice(
                    application,
                    project,
                    NotificationKind::InterviewDeclined,
                    "Colloquio rifiutato",
                    interview::decline_message(
                        &project.title,
                        application
                            .professional_response_reason
                            .as_deref()
                            .unwrap_or_default(),
                    ),
                );
                request.payload.response_message =
                    application.professional_response_reason.clone();
                request
            },
        )
    }

    /// Professional proposes a different time without accepting outright.
    pub fn reschedule_interview(
        &self,
        application_id: &ApplicationId,
        request: RescheduleRequest,
    ) -> Result<TransitionReceipt, CandidacyError> {
        let notice_request = request.clone();
        self.professional_response(
            application_id,
            ApplicationStatus::ColloquioRipianificatoProf,
            move |application| {
                application.professional_new_date_proposal = Some(request.new_date);
                application.professional_response_reason = request
                    .message
                    .as_deref()
                    .map(str::trim)
                    .filter(|text| !text.is_empty())
                    .map(str::to_string);
                Ok(())
            },
            move |application, project| {
                let mut notice = company_notice(
                    application,
                    project,
                    NotificationKind::InterviewRescheduled,
                    "Nuova data proposta",
                    interview::reschedule_message(&project.title, &notice_request),
                );
                notice.payload.proposed_date = Some(notice_request.new_date);
                notice.payload.response_message = notice_request.message.clone();
                notice
            },
        )
    }

    /// Professional withdraws the candidacy, deleting the document.
    /// Disallowed once rejected: the rejection is terminal and informative.
    pub fn withdraw(
        &self,
        application_id: &ApplicationId,
        professional: &ProfessionalId,
    ) -> Result<ProjectApplication, CandidacyError> {
        let application = self.load(application_id)?;
        if application.professional_id != *professional {
            return Err(CandidacyError::NotOwner);
        }
        if application.status == ApplicationStatus::Rifiutata {
            return Err(CandidacyError::WithdrawalNotPermitted {
                status: application.status,
            });
        }
        self.repository.delete(application_id)?;
        Ok(application)
    }

    /// Re-dispatch a notice whose first delivery failed, without touching
    /// the already-written status.
    pub fn retry_notification(
        &self,
        request: NoticeRequest,
    ) -> Result<UserNotification, CandidacyError> {
        Ok(self.dispatcher.dispatch(request)?)
    }

    pub fn get(&self, application_id: &ApplicationId) -> Result<ProjectApplication, CandidacyError> {
        self.load(application_id)
    }

    pub fn for_project(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<ProjectApplication>, CandidacyError> {
        Ok(self.repository.for_project(project)?)
    }

    pub fn for_professional(
        &self,
        professional: &ProfessionalId,
    ) -> Result<Vec<ProjectApplication>, CandidacyError> {
        Ok(self.repository.for_professional(professional)?)
    }

    pub fn feed(&self, user: &UserId) -> Result<Vec<UserNotification>, CandidacyError> {
        Ok(self.dispatcher.feed(user)?)
    }

    pub fn mark_notification_read(
        &self,
        id: &NotificationId,
    ) -> Result<UserNotification, CandidacyError> {
        Ok(self.dispatcher.mark_read(id)?)
    }

    fn load(&self, id: &ApplicationId) -> Result<ProjectApplication, CandidacyError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| CandidacyError::ApplicationNotFound(id.clone()))
    }

    fn load_project(&self, id: &ProjectId) -> Result<ProjectSnapshot, CandidacyError> {
        self.directory
            .project(id)?
            .ok_or_else(|| CandidacyError::ProjectNotFound(id.clone()))
    }

    fn guarded_update(
        &self,
        expected: ApplicationStatus,
        application: ProjectApplication,
    ) -> Result<ProjectApplication, CandidacyError> {
        let id = application.id.clone();
        match self.repository.update_if_status(expected, application) {
            Ok(stored) => Ok(stored),
            Err(RepositoryError::StalePrecondition { expected, found }) => {
                Err(CandidacyError::StaleState { expected, found })
            }
            Err(RepositoryError::NotFound) => Err(CandidacyError::ApplicationNotFound(id)),
            Err(other) => Err(CandidacyError::Repository(other)),
        }
    }

    /// Shared transition path: load, consult the table, validate and apply
    /// the payload, write behind the status compare-and-swap, then dispatch
    /// exactly one notice to the counterparty.
    fn transition_with<F, M>(
        &self,
        application_id: &ApplicationId,
        target: ApplicationStatus,
        prepare: F,
        notice: M,
    ) -> Result<TransitionReceipt, CandidacyError>
    where
        F: FnOnce(&mut ProjectApplication) -> Result<(), CandidacyError>,
        M: FnOnce(&ProjectApplication, &ProjectSnapshot) -> NoticeRequest,
    {
        let application = self.load(application_id)?;
        let project = self.load_project(&application.project_id)?;
        transitions::ensure_legal(application.status, target)?;

        let expected = application.status;
        let mut updated = application;
        prepare(&mut updated)?;
        updated.status = target;
        updated.updated_at = Utc::now();

        let stored = self.guarded_update(expected, updated)?;
        let request = notice(&stored, &project);
        Ok(TransitionReceipt {
            notification: self.dispatcher.dispatch_reported(request),
            application: stored,
        })
    }

    /// Professional responses are only meaningful while the candidacy is
    /// still `colloquio_proposto`; anything else means the client acted on
    /// stale state and must re-fetch.
    fn professional_response<F, M>(
        &self,
        application_id: &ApplicationId,
        target: ApplicationStatus,
        prepare: F,
        notice: M,
    ) -> Result<TransitionReceipt, CandidacyError>
    where
        F: FnOnce(&mut ProjectApplication) -> Result<(), CandidacyError>,
        M: FnOnce(&ProjectApplication, &ProjectSnapshot) -> NoticeRequest,
    {
        let application = self.load(application_id)?;
        if application.status != ApplicationStatus::ColloquioProposto {
            return Err(CandidacyError::StaleState {
                expected: ApplicationStatus::ColloquioProposto,
                found: application.status,
            });
        }
        let project = self.load_project(&application.project_id)?;

        let mut updated = application;
        prepare(&mut updated)?;
        updated.status = target;
        updated.updated_at = Utc::now();

        let stored = self.guarded_update(ApplicationStatus::ColloquioProposto, updated)?;
        let request = notice(&stored, &project);
        Ok(TransitionReceipt {
            notification: self.dispatcher.dispatch_reported(request),
            application: stored,
        })
    }
}
