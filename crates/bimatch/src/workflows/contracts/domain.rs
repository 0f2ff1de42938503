use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::candidacy::domain::{ApplicationId, CompanyId, ProfessionalId, ProjectId};

/// Identifier wrapper for generated collaboration contracts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractId(pub String);

impl std::fmt::Display for ContractId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review pipeline status of a contract document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    Draft,
    Generated,
    PendingReview,
    Approved,
    Rejected,
    Archived,
}

impl ContractStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ContractStatus::Draft => "DRAFT",
            ContractStatus::Generated => "GENERATED",
            ContractStatus::PendingReview => "PENDING_REVIEW",
            ContractStatus::Approved => "APPROVED",
            ContractStatus::Rejected => "REJECTED",
            ContractStatus::Archived => "ARCHIVED",
        }
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Fiscal identity of the professional party as it will appear in the text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalParty {
    pub display_name: String,
    pub vat_number: Option<String>,
    pub fiscal_code: Option<String>,
    pub fiscal_address: Option<String>,
}

/// Fiscal identity of the hiring company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyParty {
    pub display_name: String,
    pub vat_number: Option<String>,
    pub legal_representative: Option<String>,
    pub legal_address: Option<String>,
}

/// Engagement facts pulled from the project plus admin-entered overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectTerms {
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub deliverables: Vec<String>,
}

/// Agreed compensation. Amounts are kept in cents to stay exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTerms {
    pub total_amount_cents: i64,
    pub currency: String,
}

impl Default for PaymentTerms {
    fn default() -> Self {
        Self {
            total_amount_cents: 0,
            currency: "EUR".to_string(),
        }
    }
}

/// The structured payload assembled before text generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractData {
    pub professional: ProfessionalParty,
    pub company: CompanyParty,
    pub project: ProjectTerms,
    pub payment: PaymentTerms,
}

/// A collaboration contract moving through the review pipeline.
///
/// The text-related metadata (`word_count`, `article_count`) is always the
/// output of the same analysis pass the validator ran, never recomputed
/// separately, so the stored numbers cannot drift from what was validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub application_id: ApplicationId,
    pub project_id: ProjectId,
    pub professional_id: ProfessionalId,
    pub company_id: CompanyId,
    pub data: ContractData,
    pub generated_text: Option<String>,
    pub word_count: Option<usize>,
    pub article_count: Option<usize>,
    pub ai_model: Option<String>,
    pub ai_prompt_version: Option<String>,
    pub generated_at: Option<DateTime<Utc>>,
    pub status: ContractStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    pub fn status_view(&self) -> ContractStatusView {
        ContractStatusView {
            contract_id: self.id.clone(),
            status: self.status.label(),
            word_count: self.word_count,
            article_count: self.article_count,
            updated_at: self.updated_at,
        }
    }
}

/// Sanitized representation of a contract's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ContractStatusView {
    pub contract_id: ContractId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_count: Option<usize>,
    pub updated_at: DateTime<Utc>,
}
