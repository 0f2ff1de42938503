//! Contract pipeline: draft assembly from a qualifying candidacy, AI text
//! generation behind a content gate, and the admin-only review flow that
//! sends the document to both parties.

pub mod domain;
pub mod draft;
pub mod generator;
pub mod repository;
pub mod review;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    CompanyParty, Contract, ContractData, ContractId, ContractStatus, ContractStatusView,
    PaymentTerms, ProfessionalParty, ProjectTerms,
};
pub use draft::{ContractDraftBuilder, DraftOverrides, MissingFieldError};
pub use generator::{build_prompt, GenerationError, GenerationParams, TextGenerator};
pub use repository::{ContractRepository, RepositoryError};
pub use review::{can_edit, ReviewViolation};
pub use router::contract_router;
pub use service::{ContractError, ContractReceipt, ContractService, SendRecipients};
pub use validation::{
    analyze, validate, DocumentMetrics, IncompleteDocumentError, MANDATORY_MARKERS,
    MIN_ARTICLE_COUNT, MIN_WORD_COUNT,
};
