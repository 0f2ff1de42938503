//! Read-only lookup of projects and party profiles.
//!
//! The candidacy engine only needs the parent project to resolve the hiring
//! company and a display title; the contract pipeline additionally pulls the
//! fiscal facts both parties registered on their profiles.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::candidacy::domain::{CompanyId, ProfessionalId, ProjectId};

/// Minimal description of an advertised project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub id: ProjectId,
    pub title: String,
    pub company_id: CompanyId,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub deliverables: Vec<String>,
}

/// Fiscal and display facts a professional registered on their profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalProfile {
    pub id: ProfessionalId,
    pub display_name: String,
    pub vat_number: Option<String>,
    pub fiscal_code: Option<String>,
    pub fiscal_address: Option<String>,
}

/// Fiscal and display facts a company registered on its profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub id: CompanyId,
    pub display_name: String,
    pub vat_number: Option<String>,
    pub legal_representative: Option<String>,
    pub legal_address: Option<String>,
}

/// Lookup abstraction over the project and profile collections.
pub trait ProjectDirectory: Send + Sync {
    fn project(&self, id: &ProjectId) -> Result<Option<ProjectSnapshot>, DirectoryError>;
    fn professional(
        &self,
        id: &ProfessionalId,
    ) -> Result<Option<ProfessionalProfile>, DirectoryError>;
    fn company(&self, id: &CompanyId) -> Result<Option<CompanyProfile>, DirectoryError>;
}

/// Error enumeration for directory failures.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}
