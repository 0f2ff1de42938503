use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::notifications::UserId;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier of the advertised project a professional applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub String);

/// Identifier of the applying professional.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfessionalId(pub String);

/// Identifier of the hiring company, derived from the parent project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(pub String);

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for ProfessionalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&ProfessionalId> for UserId {
    fn from(id: &ProfessionalId) -> Self {
        UserId(id.0.clone())
    }
}

impl From<&CompanyId> for UserId {
    fn from(id: &CompanyId) -> Self {
        UserId(id.0.clone())
    }
}

/// Single source of truth for where a candidacy stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Inviata,
    InRevisione,
    Preselezionata,
    ColloquioProposto,
    ColloquioAccettatoProf,
    ColloquioRifiutatoProf,
    ColloquioRipianificatoProf,
    Accettata,
    Rifiutata,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Inviata => "inviata",
            ApplicationStatus::InRevisione => "in_revisione",
            ApplicationStatus::Preselezionata => "preselezionata",
            ApplicationStatus::ColloquioProposto => "colloquio_proposto",
            ApplicationStatus::ColloquioAccettatoProf => "colloquio_accettato_prof",
            ApplicationStatus::ColloquioRifiutatoProf => "colloquio_rifiutato_prof",
            ApplicationStatus::ColloquioRipianificatoProf => "colloquio_ripianificato_prof",
            ApplicationStatus::Accettata => "accettata",
            ApplicationStatus::Rifiutata => "rifiutata",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What the professional submits when applying to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    pub project_id: ProjectId,
    pub professional_id: ProfessionalId,
    pub cover_letter_message: String,
    #[serde(default)]
    pub relevant_skills: BTreeSet<String>,
    #[serde(default)]
    pub availability_notes: Option<String>,
}

/// A professional's candidacy for a specific project.
///
/// The negotiation fields stay `None` outside the interview sub-protocol;
/// `application_date` is immutable after creation while `updated_at` moves
/// on every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectApplication {
    pub id: ApplicationId,
    pub project_id: ProjectId,
    pub professional_id: ProfessionalId,
    pub company_id: CompanyId,
    pub status: ApplicationStatus,
    pub cover_letter_message: String,
    pub relevant_skills: BTreeSet<String>,
    pub availability_notes: Option<String>,
    pub interview_proposal_message: Option<String>,
    pub proposed_interview_date: Option<NaiveDate>,
    pub professional_response_reason: Option<String>,
    pub professional_new_date_proposal: Option<NaiveDate>,
    pub rejection_reason: Option<String>,
    pub application_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectApplication {
    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.id.clone(),
            status: self.status.label(),
            updated_at: self.updated_at,
        }
    }
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub status: &'static str,
    pub updated_at: DateTime<Utc>,
}
