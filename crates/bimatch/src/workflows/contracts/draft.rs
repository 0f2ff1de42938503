//! Assembly and completeness gate for the contract draft payload.
//!
//! The builder pulls party facts from the directory and layers admin
//! overrides on top. Completeness is checked both by the caller before
//! generation and again inside the generation call itself: a legal
//! document never trusts a single validation layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{CompanyParty, ContractData, ProfessionalParty, ProjectTerms};
use crate::workflows::directory::{CompanyProfile, ProfessionalProfile, ProjectSnapshot};

/// A required contract field is absent. The payload names the field with a
/// dotted path such as `payment.total_amount`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("required contract field missing: {0}")]
pub struct MissingFieldError(pub &'static str);

/// Admin-entered values layered on top of what the directory provides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DraftOverrides {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub deliverables: Option<Vec<String>>,
    #[serde(default)]
    pub total_amount_cents: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Collects professional, company, and project facts into a `ContractData`.
#[derive(Debug, Clone)]
pub struct ContractDraftBuilder {
    data: ContractData,
}

impl ContractDraftBuilder {
    pub fn from_directory(
        professional: &ProfessionalProfile,
        company: &CompanyProfile,
        project: &ProjectSnapshot,
    ) -> Self {
        Self {
            data: ContractData {
                professional: ProfessionalParty {
                    display_name: professional.display_name.clone(),
                    vat_number: professional.vat_number.clone(),
                    fiscal_code: professional.fiscal_code.clone(),
                    fiscal_address: professional.fiscal_address.clone(),
                },
                company: CompanyParty {
                    display_name: company.display_name.clone(),
                    vat_number: company.vat_number.clone(),
                    legal_representative: company.legal_representative.clone(),
                    legal_address: company.legal_address.clone(),
                },
                project: ProjectTerms {
                    title: project.title.clone(),
                    start_date: project.start_date,
                    end_date: project.end_date,
                    deliverables: project.deliverables.clone(),
                },
                payment: Default::default(),
            },
        }
    }

    pub fn with_overrides(mut self, overrides: DraftOverrides) -> Self {
        if let Some(start_date) = overrides.start_date {
            self.data.project.start_date = Some(start_date);
        }
        if let Some(end_date) = overrides.end_date {
            self.data.project.end_date = Some(end_date);
        }
        if let Some(deliverables) = overrides.deliverables {
            self.data.project.deliverables = deliverables;
        }
        if let Some(total_amount_cents) = overrides.total_amount_cents {
            self.data.payment.total_amount_cents = total_amount_cents;
        }
        if let Some(currency) = overrides.currency {
            self.data.payment.currency = currency;
        }
        self
    }

    /// The assembled payload. Drafts may still be incomplete at this point;
    /// completeness is enforced by [`ContractData::validate`] before any
    /// generation happens.
    pub fn finish(self) -> ContractData {
        self.data
    }

    pub fn validate(&self) -> Result<(), MissingFieldError> {
        self.data.validate()
    }
}

fn present(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|text| !text.trim().is_empty())
        .unwrap_or(false)
}

impl ContractData {
    /// Check every field generation depends on, reporting the first missing
    /// one by its dotted path.
    pub fn validate(&self) -> Result<(), MissingFieldError> {
        if !present(&self.professional.vat_number) {
            return Err(MissingFieldError("professional.vat_number"));
        }
        if !present(&self.professional.fiscal_code) {
            return Err(MissingFieldError("professional.fiscal_code"));
        }
        if !present(&self.professional.fiscal_address) {
            return Err(MissingFieldError("professional.fiscal_address"));
        }
        if !present(&self.company.vat_number) {
            return Err(MissingFieldError("company.vat_number"));
        }
        if !present(&self.company.legal_representative) {
            return Err(MissingFieldError("company.legal_representative"));
        }
        if !present(&self.company.legal_address) {
            return Err(MissingFieldError("company.legal_address"));
        }
        if self.project.start_date.is_none() {
            return Err(MissingFieldError("project.start_date"));
        }
        if self.project.end_date.is_none() {
            return Err(MissingFieldError("project.end_date"));
        }
        if self
            .project
            .deliverables
            .iter()
            .all(|deliverable| deliverable.trim().is_empty())
        {
            return Err(MissingFieldError("project.deliverables"));
        }
        if self.payment.total_amount_cents <= 0 {
            return Err(MissingFieldError("payment.total_amount"));
        }
        Ok(())
    }
}
