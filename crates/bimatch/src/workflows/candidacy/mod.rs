//! Candidacy lifecycle: submission, company review, interview negotiation,
//! acceptance or rejection, and the notice fan-out that keeps both parties
//! synchronized.

pub mod domain;
pub mod interview;
pub mod repository;
pub mod router;
pub mod service;
pub mod transitions;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationStatus, ApplicationStatusView, ApplicationSubmission, CompanyId,
    ProfessionalId, ProjectApplication, ProjectId,
};
pub use interview::{InterviewProposal, InterviewReply, RescheduleRequest};
pub use repository::{ApplicationRepository, RepositoryError};
pub use router::candidacy_router;
pub use service::{CandidacyError, CandidacyService, TransitionReceipt};
pub use transitions::{legal_targets, is_terminal, TransitionViolation, MIN_REASON_LEN};
