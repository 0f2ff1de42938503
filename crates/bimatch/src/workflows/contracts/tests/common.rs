use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};

use crate::config::GeneratorConfig;
use crate::workflows::candidacy::domain::{
    ApplicationId, ApplicationStatus, CompanyId, ProfessionalId, ProjectApplication, ProjectId,
};
use crate::workflows::candidacy::repository::{
    ApplicationRepository, RepositoryError as ApplicationRepositoryError,
};
use crate::workflows::contracts::domain::{Contract, ContractId, ContractStatus};
use crate::workflows::contracts::draft::DraftOverrides;
use crate::workflows::contracts::generator::{GenerationError, GenerationParams, TextGenerator};
use crate::workflows::contracts::repository::{ContractRepository, RepositoryError};
use crate::workflows::contracts::service::ContractService;
use crate::workflows::directory::{
    CompanyProfile, DirectoryError, ProfessionalProfile, ProjectDirectory, ProjectSnapshot,
};
use crate::workflows::notifications::{
    NotificationError, NotificationId, NotificationRepository, UserId, UserNotification,
};

pub(super) const PROJECT_ID: &str = "prj-torre";
pub(super) const PROJECT_TITLE: &str = "Torre Eurosky";
pub(super) const COMPANY_ID: &str = "company-7";
pub(super) const PROFESSIONAL_ID: &str = "prof-42";
pub(super) const APPLICATION_ID: &str = "cand-accepted";

pub(super) fn company_user() -> UserId {
    UserId(COMPANY_ID.to_string())
}

pub(super) fn professional_user() -> UserId {
    UserId(PROFESSIONAL_ID.to_string())
}

pub(super) fn accepted_application() -> ProjectApplication {
    let now = Utc::now();
    ProjectApplication {
        id: ApplicationId(APPLICATION_ID.to_string()),
        project_id: ProjectId(PROJECT_ID.to_string()),
        professional_id: ProfessionalId(PROFESSIONAL_ID.to_string()),
        company_id: CompanyId(COMPANY_ID.to_string()),
        status: ApplicationStatus::Accettata,
        cover_letter_message: "Candidatura accettata".to_string(),
        relevant_skills: BTreeSet::new(),
        availability_notes: None,
        interview_proposal_message: None,
        proposed_interview_date: None,
        professional_response_reason: None,
        professional_new_date_proposal: None,
        rejection_reason: None,
        application_date: now,
        updated_at: now,
    }
}

pub(super) fn professional_profile() -> ProfessionalProfile {
    ProfessionalProfile {
        id: ProfessionalId(PROFESSIONAL_ID.to_string()),
        display_name: "Maria Rossi".to_string(),
        vat_number: Some("01234567890".to_string()),
        fiscal_code: Some("RSSMRA80A01H501U".to_string()),
        fiscal_address: Some("Via Roma 1, Milano".to_string()),
    }
}

pub(super) fn company_profile() -> CompanyProfile {
    CompanyProfile {
        id: CompanyId(COMPANY_ID.to_string()),
        display_name: "Edilizia Meridiana S.r.l.".to_string(),
        vat_number: Some("09876543210".to_string()),
        legal_representative: Some("Giovanni Bianchi".to_string()),
        legal_address: Some("Corso Buenos Aires 20, Milano".to_string()),
    }
}

pub(super) fn project() -> ProjectSnapshot {
    ProjectSnapshot {
        id: ProjectId(PROJECT_ID.to_string()),
        title: PROJECT_TITLE.to_string(),
        company_id: CompanyId(COMPANY_ID.to_string()),
        start_date: NaiveDate::from_ymd_opt(2025, 4, 1),
        end_date: NaiveDate::from_ymd_opt(2025, 12, 31),
        deliverables: vec!["Modello architettonico LOD 300".to_string()],
    }
}

pub(super) fn complete_overrides() -> DraftOverrides {
    DraftOverrides {
        total_amount_cents: Some(1_500_000),
        ..Default::default()
    }
}

/// Deterministic stand-in for the text collaborator: renders a complete
/// contract from the draft facts with 12 numbered articles and exactly
/// 1200 words.
#[derive(Default)]
pub(super) struct CannedGenerator {
    calls: AtomicUsize,
}

impl CannedGenerator {
    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub(super) fn canned_contract_text() -> String {
    let professional = professional_profile();
    let company = company_profile();
    let mut text = format!(
        "CONTRATTO DI COLLABORAZIONE PROFESSIONALE per il progetto \"{title}\". Tra \
         {company} (Partita IVA {company_vat}), rappresentata da {representative}, con sede \
         legale in {company_address}, e {professional} (Partita IVA {professional_vat}, \
         Codice Fiscale {fiscal_code}), con domicilio fiscale in {fiscal_address}. ",
        title = PROJECT_TITLE,
        company = company.display_name,
        company_vat = company.vat_number.as_deref().unwrap_or_default(),
        representative = company.legal_representative.as_deref().unwrap_or_default(),
        company_address = company.legal_address.as_deref().unwrap_or_default(),
        professional = professional.display_name,
        professional_vat = professional.vat_number.as_deref().unwrap_or_default(),
        fiscal_code = professional.fiscal_code.as_deref().unwrap_or_default(),
        fiscal_address = professional.fiscal_address.as_deref().unwrap_or_default(),
    );

    let articles = [
        "Oggetto dell'incarico",
        "Durata dell'incarico",
        "Compenso",
        "Modalità di pagamento",
        "Obblighi del professionista",
        "Obblighi del committente",
        "Diritto di recesso",
        "Protezione dei dati personali",
        "Proprietà intellettuale",
        "Riservatezza",
        "Foro competente",
        "Disposizioni finali",
    ];
    for (index, title) in articles.iter().enumerate() {
        text.push_str(&format!(
            "Art. {} - {title}. Le parti disciplinano quanto segue in relazione al presente \
             incarico professionale. ",
            index + 1
        ));
    }
    text.push_str("Firme. Il Professionista e il Committente sottoscrivono il presente atto. ");

    while text.split_whitespace().count() < 1200 {
        text.push_str("clausola ");
    }
    text
}

impl TextGenerator for CannedGenerator {
    fn generate(
        &self,
        _prompt: &str,
        _params: GenerationParams,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(canned_contract_text())
    }
}

/// A collaborator that returns text too thin to pass the content gate.
pub(super) struct ThinGenerator;

impl TextGenerator for ThinGenerator {
    fn generate(&self, _: &str, _: GenerationParams) -> Result<String, GenerationError> {
        Ok("Art. 1 - Oggetto. Breve bozza senza le clausole richieste.".to_string())
    }
}

/// A collaborator that is down.
pub(super) struct OfflineGenerator;

impl TextGenerator for OfflineGenerator {
    fn generate(&self, _: &str, _: GenerationParams) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable("model endpoint offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryContracts {
    records: Arc<Mutex<HashMap<ContractId, Contract>>>,
}

impl ContractRepository for MemoryContracts {
    fn insert(&self, contract: Contract) -> Result<Contract, RepositoryError> {
        let mut guard = self.records.lock().expect("contract mutex poisoned");
        if guard.contains_key(&contract.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(contract.id.clone(), contract.clone());
        Ok(contract)
    }

    fn fetch(&self, id: &ContractId) -> Result<Option<Contract>, RepositoryError> {
        let guard = self.records.lock().expect("contract mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Option<Contract>, RepositoryError> {
        let guard = self.records.lock().expect("contract mutex poisoned");
        Ok(guard
            .values()
            .find(|contract| contract.application_id == *application)
            .cloned())
    }

    fn update_if_status(
        &self,
        expected: ContractStatus,
        contract: Contract,
    ) -> Result<Contract, RepositoryError> {
        let mut guard = self.records.lock().expect("contract mutex poisoned");
        let stored = guard.get(&contract.id).ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(RepositoryError::StalePrecondition {
                expected,
                found: stored.status,
            });
        }
        guard.insert(contract.id.clone(), contract.clone());
        Ok(contract)
    }

    fn list_by_status(&self, status: ContractStatus) -> Result<Vec<Contract>, RepositoryError> {
        let guard = self.records.lock().expect("contract mutex poisoned");
        Ok(guard
            .values()
            .filter(|contract| contract.status == status)
            .cloned()
            .collect())
    }
}

impl MemoryContracts {
    pub(super) fn overwrite_status(&self, id: &ContractId, status: ContractStatus) {
        let mut guard = self.records.lock().expect("contract mutex poisoned");
        if let Some(contract) = guard.get_mut(id) {
            contract.status = status;
        }
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryApplications {
    records: Arc<Mutex<HashMap<ApplicationId, ProjectApplication>>>,
}

impl MemoryApplications {
    pub(super) fn seed(&self, application: ProjectApplication) {
        self.records
            .lock()
            .expect("application mutex poisoned")
            .insert(application.id.clone(), application);
    }
}

impl ApplicationRepository for MemoryApplications {
    fn insert(
        &self,
        application: ProjectApplication,
    ) -> Result<ProjectApplication, ApplicationRepositoryError> {
        self.seed(application.clone());
        Ok(application)
    }

    fn fetch(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ProjectApplication>, ApplicationRepositoryError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_for_project_and_professional(
        &self,
        project: &ProjectId,
        professional: &ProfessionalId,
    ) -> Result<Option<ProjectApplication>, ApplicationRepositoryError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard
            .values()
            .find(|application| {
                application.project_id == *project && application.professional_id == *professional
            })
            .cloned())
    }

    fn update_if_status(
        &self,
        expected: ApplicationStatus,
        application: ProjectApplication,
    ) -> Result<ProjectApplication, ApplicationRepositoryError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        let stored = guard
            .get(&application.id)
            .ok_or(ApplicationRepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(ApplicationRepositoryError::StalePrecondition {
                expected,
                found: stored.status,
            });
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn delete(&self, id: &ApplicationId) -> Result<(), ApplicationRepositoryError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(ApplicationRepositoryError::NotFound)
    }

    fn for_project(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<ProjectApplication>, ApplicationRepositoryError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard
            .values()
            .filter(|application| application.project_id == *project)
            .cloned()
            .collect())
    }

    fn for_professional(
        &self,
        professional: &ProfessionalId,
    ) -> Result<Vec<ProjectApplication>, ApplicationRepositoryError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard
            .values()
            .filter(|application| application.professional_id == *professional)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    records: Arc<Mutex<Vec<UserNotification>>>,
}

impl MemoryNotifications {
    pub(super) fn for_recipient(&self, user: &UserId) -> Vec<UserNotification> {
        self.records
            .lock()
            .expect("notification mutex poisoned")
            .iter()
            .filter(|notification| notification.user_id == *user)
            .cloned()
            .collect()
    }
}

impl NotificationRepository for MemoryNotifications {
    fn create(&self, notification: UserNotification) -> Result<UserNotification, NotificationError> {
        let mut guard = self.records.lock().expect("notification mutex poisoned");
        guard.push(notification.clone());
        Ok(notification)
    }

    fn for_user(&self, user: &UserId) -> Result<Vec<UserNotification>, NotificationError> {
        Ok(self.for_recipient(user))
    }

    fn mark_read(&self, id: &NotificationId) -> Result<UserNotification, NotificationError> {
        let mut guard = self.records.lock().expect("notification mutex poisoned");
        let notification = guard
            .iter_mut()
            .find(|notification| notification.id == *id)
            .ok_or(NotificationError::NotFound)?;
        notification.is_read = true;
        Ok(notification.clone())
    }
}

#[derive(Default, Clone)]
pub(super) struct StaticDirectory {
    projects: Arc<Mutex<HashMap<ProjectId, ProjectSnapshot>>>,
    professionals: Arc<Mutex<HashMap<ProfessionalId, ProfessionalProfile>>>,
    companies: Arc<Mutex<HashMap<CompanyId, CompanyProfile>>>,
}

impl StaticDirectory {
    pub(super) fn seeded() -> Self {
        let directory = Self::default();
        directory
            .projects
            .lock()
            .expect("directory mutex poisoned")
            .insert(ProjectId(PROJECT_ID.to_string()), project());
        directory
            .professionals
            .lock()
            .expect("directory mutex poisoned")
            .insert(
                ProfessionalId(PROFESSIONAL_ID.to_string()),
                professional_profile(),
            );
        directory
            .companies
            .lock()
            .expect("directory mutex poisoned")
            .insert(CompanyId(COMPANY_ID.to_string()), company_profile());
        directory
    }

    pub(super) fn strip_professional_vat(&self) {
        let mut guard = self.professionals.lock().expect("directory mutex poisoned");
        if let Some(profile) = guard.get_mut(&ProfessionalId(PROFESSIONAL_ID.to_string())) {
            profile.vat_number = None;
        }
    }
}

impl ProjectDirectory for StaticDirectory {
    fn project(&self, id: &ProjectId) -> Result<Option<ProjectSnapshot>, DirectoryError> {
        let guard = self.projects.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn professional(
        &self,
        id: &ProfessionalId,
    ) -> Result<Option<ProfessionalProfile>, DirectoryError> {
        let guard = self.professionals.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn company(&self, id: &CompanyId) -> Result<Option<CompanyProfile>, DirectoryError> {
        let guard = self.companies.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) struct Harness<G> {
    pub(super) service: Arc<
        ContractService<MemoryContracts, MemoryApplications, MemoryNotifications, StaticDirectory, G>,
    >,
    pub(super) contracts: Arc<MemoryContracts>,
    pub(super) applications: Arc<MemoryApplications>,
    pub(super) notifications: Arc<MemoryNotifications>,
    pub(super) directory: Arc<StaticDirectory>,
    pub(super) generator: Arc<G>,
}

impl<G> Harness<G> {
    pub(super) fn seed_application(&self, application: ProjectApplication) {
        self.applications.seed(application);
    }
}

pub(super) fn harness_with<G>(generator: G) -> Harness<G>
where
    G: TextGenerator + 'static,
{
    let contracts = Arc::new(MemoryContracts::default());
    let applications = Arc::new(MemoryApplications::default());
    applications.seed(accepted_application());
    let notifications = Arc::new(MemoryNotifications::default());
    let directory = Arc::new(StaticDirectory::seeded());
    let generator = Arc::new(generator);
    let service = Arc::new(ContractService::new(
        contracts.clone(),
        applications.clone(),
        notifications.clone(),
        directory.clone(),
        generator.clone(),
        GeneratorConfig::default(),
    ));
    Harness {
        service,
        contracts,
        applications,
        notifications,
        directory,
        generator,
    }
}
