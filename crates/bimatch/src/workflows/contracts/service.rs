use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::domain::{Contract, ContractId, ContractStatus};
use super::draft::{ContractDraftBuilder, DraftOverrides, MissingFieldError};
use super::generator::{self, GenerationError, GenerationParams, TextGenerator};
use super::repository::{ContractRepository, RepositoryError};
use super::review::{self, ReviewViolation};
use super::validation::{self, IncompleteDocumentError};
use crate::config::GeneratorConfig;
use crate::workflows::candidacy::domain::{
    ApplicationId, ApplicationStatus, CompanyId, ProfessionalId, ProjectId,
};
use crate::workflows::candidacy::repository::{
    ApplicationRepository, RepositoryError as ApplicationRepositoryError,
};
use crate::workflows::directory::{DirectoryError, ProjectDirectory};
use crate::workflows::notifications::{
    NoticeRequest, NotificationDelivery, NotificationDispatcher, NotificationError,
    NotificationKind, NotificationPayload, NotificationRepository, UserId,
};

/// Which parties a contract is sent to for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendRecipients {
    Company,
    Professional,
    Both,
}

impl SendRecipients {
    fn includes_company(self) -> bool {
        matches!(self, SendRecipients::Company | SendRecipients::Both)
    }

    fn includes_professional(self) -> bool {
        matches!(self, SendRecipients::Professional | SendRecipients::Both)
    }
}

/// Result of a contract operation that fans notices out to the parties.
#[derive(Debug)]
pub struct ContractReceipt {
    pub contract: Contract,
    pub notifications: Vec<NotificationDelivery>,
}

/// Error raised by the contract pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("contract '{0}' not found")]
    ContractNotFound(ContractId),
    #[error("application '{0}' not found")]
    ApplicationNotFound(ApplicationId),
    #[error("professional profile '{0}' not found")]
    ProfessionalNotFound(ProfessionalId),
    #[error("company profile '{0}' not found")]
    CompanyNotFound(CompanyId),
    #[error("project '{0}' not found")]
    ProjectNotFound(ProjectId),
    #[error("application in status '{status}' is not eligible for contract drafting")]
    IneligibleApplication { status: ApplicationStatus },
    #[error("a contract for application '{0}' already exists")]
    DuplicateContract(ApplicationId),
    #[error(transparent)]
    Review(#[from] ReviewViolation),
    #[error("contract text is frozen in status '{status}'")]
    TextFrozen { status: ContractStatus },
    #[error("the contract has no text to validate or send")]
    MissingText,
    #[error("contract status changed before the write (expected '{expected}', found '{found}')")]
    StaleState {
        expected: ContractStatus,
        found: ContractStatus,
    },
    #[error(transparent)]
    MissingField(#[from] MissingFieldError),
    #[error(transparent)]
    IncompleteDocument(#[from] IncompleteDocumentError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Applications(#[from] ApplicationRepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

static CONTRACT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_contract_id() -> ContractId {
    let id = CONTRACT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ContractId(format!("ctr-{id:06}"))
}

/// Statuses from which an admin may pull an application into drafting:
/// the professional accepted the interview, or the candidacy was accepted.
fn is_draft_eligible(status: ApplicationStatus) -> bool {
    matches!(
        status,
        ApplicationStatus::ColloquioAccettatoProf | ApplicationStatus::Accettata
    )
}

/// Admin-facing pipeline from draft assembly through generation, party
/// review, and archival. Every status change funnels through the review
/// transition table and lands via a compare-and-swap, mirroring the
/// candidacy engine.
pub struct ContractService<C, A, N, P, G> {
    contracts: Arc<C>,
    applications: Arc<A>,
    dispatcher: NotificationDispatcher<N>,
    directory: Arc<P>,
    generator: Arc<G>,
    config: GeneratorConfig,
}

impl<C, A, N, P, G> ContractService<C, A, N, P, G>
where
    C: ContractRepository + 'static,
    A: ApplicationRepository + 'static,
    N: NotificationRepository + 'static,
    P: ProjectDirectory + 'static,
    G: TextGenerator + 'static,
{
    pub fn new(
        contracts: Arc<C>,
        applications: Arc<A>,
        notifications: Arc<N>,
        directory: Arc<P>,
        generator: Arc<G>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            contracts,
            applications,
            dispatcher: NotificationDispatcher::new(notifications),
            directory,
            generator,
            config,
        }
    }

    /// Pull a qualifying application into a new contract draft, assembling
    /// the data payload from the directory plus admin overrides.
    pub fn create_draft(
        &self,
        application_id: &ApplicationId,
        overrides: DraftOverrides,
    ) -> Result<Contract, ContractError> {
        let application = self
            .applications
            .fetch(application_id)?
            .ok_or_else(|| ContractError::ApplicationNotFound(application_id.clone()))?;
        if !is_draft_eligible(application.status) {
            return Err(ContractError::IneligibleApplication {
                status: application.status,
            });
        }
        if self.contracts.find_by_application(application_id)?.is_some() {
            return Err(ContractError::DuplicateContract(application_id.clone()));
        }

        let professional = self
            .directory
            .professional(&application.professional_id)?
            .ok_or_else(|| {
                ContractError::ProfessionalNotFound(application.professional_id.clone())
            })?;
        let company = self
            .directory
            .company(&application.company_id)?
            .ok_or_else(|| ContractError::CompanyNotFound(application.company_id.clone()))?;
        let project = self
            .directory
            .project(&application.project_id)?
            .ok_or_else(|| ContractError::ProjectNotFound(application.project_id.clone()))?;

        let data = ContractDraftBuilder::from_directory(&professional, &company, &project)
            .with_overrides(overrides)
            .finish();

        let now = Utc::now();
        let contract = Contract {
            id: next_contract_id(),
            application_id: application.id,
            project_id: application.project_id,
            professional_id: application.professional_id,
            company_id: application.company_id,
            data,
            generated_text: None,
            word_count: None,
            article_count: None,
            ai_model: None,
            ai_prompt_version: None,
            generated_at: None,
            status: ContractStatus::Draft,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        };
        Ok(self.contracts.insert(contract)?)
    }

    /// Generate the contract prose from the validated draft and persist it
    /// as `GENERATED` once it passes the content gate. A rejected output is
    /// never persisted.
    pub fn generate(&self, contract_id: &ContractId) -> Result<Contract, ContractError> {
        let contract = self.load(contract_id)?;
        if !review::can_edit(contract.status) {
            return Err(ContractError::TextFrozen {
                status: contract.status,
            });
        }

        // Server-side re-validation: the client already checked, we never
        // trust a single validation layer for a legal document.
        contract.data.validate()?;

        let prompt = generator::build_prompt(&contract.data, &self.config.prompt_version);
        let text = self
            .generator
            .generate(&prompt, GenerationParams::from(&self.config))?;
        let metrics = validation::validate(&text)?;

        let expected = contract.status;
        let mut updated = contract;
        updated.generated_text = Some(text);
        updated.word_count = Some(metrics.word_count);
        updated.article_count = Some(metrics.article_count);
        updated.ai_model = Some(self.config.model.clone());
        updated.ai_prompt_version = Some(self.config.prompt_version.clone());
        updated.generated_at = Some(Utc::now());
        updated.status = ContractStatus::Generated;
        updated.updated_at = Utc::now();
        self.guarded_update(expected, updated)
    }

    /// Manually edit the text. An edit always demotes to `DRAFT`: the
    /// stored metrics are recomputed from the new text, but promotion back
    /// to `GENERATED` has to pass validation again.
    pub fn edit_text(&self, contract_id: &ContractId, body: String) -> Result<Contract, ContractError> {
        let contract = self.load(contract_id)?;
        if !review::can_edit(contract.status) {
            return Err(ContractError::TextFrozen {
                status: contract.status,
            });
        }

        let metrics = validation::analyze(&body);
        let expected = contract.status;
        let mut updated = contract;
        updated.generated_text = Some(body);
        updated.word_count = Some(metrics.word_count);
        updated.article_count = Some(metrics.article_count);
        updated.status = ContractStatus::Draft;
        updated.updated_at = Utc::now();
        self.guarded_update(expected, updated)
    }

    /// Promote an edited draft back to `GENERATED` if its text passes the
    /// content gate.
    pub fn revalidate(&self, contract_id: &ContractId) -> Result<Contract, ContractError> {
        let contract = self.load(contract_id)?;
        review::ensure_legal(contract.status, ContractStatus::Generated)?;

        let text = contract
            .generated_text
            .as_deref()
            .ok_or(ContractError::MissingText)?;
        let metrics = validation::validate(text)?;

        let expected = contract.status;
        let mut updated = contract;
        updated.word_count = Some(metrics.word_count);
        updated.article_count = Some(metrics.article_count);
        updated.status = ContractStatus::Generated;
        updated.updated_at = Utc::now();
        self.guarded_update(expected, updated)
    }

    /// Send the contract to one or both parties for review. Leaving `DRAFT`
    /// re-runs the content gate; one notice goes out per addressed party.
    pub fn send_to_parties(
        &self,
        contract_id: &ContractId,
        recipients: SendRecipients,
    ) -> Result<ContractReceipt, ContractError> {
        let contract = self.load(contract_id)?;
        review::ensure_legal(contract.status, ContractStatus::PendingReview)?;

        let text = contract
            .generated_text
            .as_deref()
            .ok_or(ContractError::MissingText)?;
        if contract.status == ContractStatus::Draft {
            validation::validate(text)?;
        }

        let expected = contract.status;
        let mut updated = contract;
        updated.status = ContractStatus::PendingReview;
        updated.updated_at = Utc::now();
        let stored = self.guarded_update(expected, updated)?;

        let mut notifications = Vec::new();
        if recipients.includes_company() {
            notifications.push(self.dispatcher.dispatch_reported(company_notice(
                &stored,
                NotificationKind::ContractPendingReview,
                "Contratto in revisione",
                format!(
                    "Il contratto di collaborazione per \"{}\" è pronto per la tua revisione.",
                    stored.data.project.title
                ),
            )));
        }
        if recipients.includes_professional() {
            notifications.push(self.dispatcher.dispatch_reported(professional_notice(
                &stored,
                NotificationKind::ContractPendingReview,
                "Contratto in revisione",
                format!(
                    "Il contratto di collaborazione per \"{}\" è pronto per la tua revisione.",
                    stored.data.project.title
                ),
            )));
        }

        Ok(ContractReceipt {
            contract: stored,
            notifications,
        })
    }

    /// Admin approves the reviewed contract; both parties are notified.
    pub fn approve(
        &self,
        contract_id: &ContractId,
        admin_notes: Option<String>,
    ) -> Result<ContractReceipt, ContractError> {
        self.finalize(
            contract_id,
            ContractStatus::Approved,
            admin_notes,
            NotificationKind::ContractApproved,
            "Contratto approvato",
            |title| format!("Il contratto di collaborazione per \"{title}\" è stato approvato."),
        )
    }

    /// Admin rejects the reviewed contract; both parties are notified.
    pub fn reject(
        &self,
        contract_id: &ContractId,
        admin_notes: Option<String>,
    ) -> Result<ContractReceipt, ContractError> {
        self.finalize(
            contract_id,
            ContractStatus::Rejected,
            admin_notes,
            NotificationKind::ContractRejected,
            "Contratto rifiutato",
            |title| {
                format!("Il contratto di collaborazione per \"{title}\" non è stato approvato.")
            },
        )
    }

    /// Move a decided contract into the read-only archive.
    pub fn archive(&self, contract_id: &ContractId) -> Result<Contract, ContractError> {
        let contract = self.load(contract_id)?;
        review::ensure_legal(contract.status, ContractStatus::Archived)?;

        let expected = contract.status;
        let mut updated = contract;
        updated.status = ContractStatus::Archived;
        updated.updated_at = Utc::now();
        self.guarded_update(expected, updated)
    }

    pub fn get(&self, contract_id: &ContractId) -> Result<Contract, ContractError> {
        self.load(contract_id)
    }

    pub fn for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<Contract>, ContractError> {
        Ok(self.contracts.find_by_application(application_id)?)
    }

    pub fn list_by_status(&self, status: ContractStatus) -> Result<Vec<Contract>, ContractError> {
        Ok(self.contracts.list_by_status(status)?)
    }

    fn finalize(
        &self,
        contract_id: &ContractId,
        target: ContractStatus,
        admin_notes: Option<String>,
        kind: NotificationKind,
        title: &str,
        message: impl Fn(&str) -> String,
    ) -> Result<ContractReceipt, ContractError> {
        let contract = self.load(contract_id)?;
        review::ensure_legal(contract.status, target)?;

        let expected = contract.status;
        let mut updated = contract;
        if admin_notes.is_some() {
            updated.admin_notes = admin_notes;
        }
        updated.status = target;
        updated.updated_at = Utc::now();
        let stored = self.guarded_update(expected, updated)?;

        let rendered = message(&stored.data.project.title);
        let notifications = vec![
            self.dispatcher.dispatch_reported(company_notice(
                &stored,
                kind,
                title,
                rendered.clone(),
            )),
            self.dispatcher
                .dispatch_reported(professional_notice(&stored, kind, title, rendered)),
        ];

        Ok(ContractReceipt {
            contract: stored,
            notifications,
        })
    }

    fn load(&self, id: &ContractId) -> Result<Contract, ContractError> {
        self.contracts
            .fetch(id)?
            .ok_or_else(|| ContractError::ContractNotFound(id.clone()))
    }

    fn guarded_update(
        &self,
        expected: ContractStatus,
        contract: Contract,
    ) -> Result<Contract, ContractError> {
        let id = contract.id.clone();
        match self.contracts.update_if_status(expected, contract) {
            Ok(stored) => Ok(stored),
            Err(RepositoryError::StalePrecondition { expected, found }) => {
                Err(ContractError::StaleState { expected, found })
            }
            Err(RepositoryError::NotFound) => Err(ContractError::ContractNotFound(id)),
            Err(other) => Err(ContractError::Repository(other)),
        }
    }
}

fn contract_payload(contract: &Contract) -> NotificationPayload {
    NotificationPayload {
        application_id: Some(contract.application_id.0.clone()),
        related_entity_id: Some(contract.id.0.clone()),
        project_title: Some(contract.data.project.title.clone()),
        ..Default::default()
    }
}

fn company_notice(
    contract: &Contract,
    kind: NotificationKind,
    title: &str,
    message: String,
) -> NoticeRequest {
    NoticeRequest {
        recipient: UserId::from(&contract.company_id),
        kind,
        title: title.to_string(),
        message,
        link_to: format!("/company/contratti/{}", contract.id.0),
        payload: contract_payload(contract),
    }
}

fn professional_notice(
    contract: &Contract,
    kind: NotificationKind,
    title: &str,
    message: String,
) -> NoticeRequest {
    NoticeRequest {
        recipient: UserId::from(&contract.professional_id),
        kind,
        title: title.to_string(),
        message,
        link_to: format!("/professional/contratti/{}", contract.id.0),
        payload: contract_payload(contract),
    }
}
