use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use bimatch::workflows::candidacy::domain::{
    ApplicationId, ApplicationStatus, CompanyId, ProfessionalId, ProjectApplication, ProjectId,
};
use bimatch::workflows::candidacy::repository::{
    ApplicationRepository, RepositoryError as ApplicationRepositoryError,
};
use bimatch::workflows::contracts::{
    Contract, ContractId, ContractRepository, ContractStatus, GenerationError, GenerationParams,
    RepositoryError as ContractRepositoryError, TextGenerator,
};
use bimatch::workflows::directory::{
    CompanyProfile, DirectoryError, ProfessionalProfile, ProjectDirectory, ProjectSnapshot,
};
use bimatch::workflows::notifications::{
    NotificationError, NotificationId, NotificationRepository, UserId, UserNotification,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ProjectApplication>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(
        &self,
        application: ProjectApplication,
    ) -> Result<ProjectApplication, ApplicationRepositoryError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        if guard.contains_key(&application.id) {
            return Err(ApplicationRepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
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
pub(crate) struct InMemoryContractRepository {
    records: Arc<Mutex<HashMap<ContractId, Contract>>>,
}

impl ContractRepository for InMemoryContractRepository {
    fn insert(&self, contract: Contract) -> Result<Contract, ContractRepositoryError> {
        let mut guard = self.records.lock().expect("contract mutex poisoned");
        if guard.contains_key(&contract.id) {
            return Err(ContractRepositoryError::Conflict);
        }
        guard.insert(contract.id.clone(), contract.clone());
        Ok(contract)
    }

    fn fetch(&self, id: &ContractId) -> Result<Option<Contract>, ContractRepositoryError> {
        let guard = self.records.lock().expect("contract mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Option<Contract>, ContractRepositoryError> {
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
    ) -> Result<Contract, ContractRepositoryError> {
        let mut guard = self.records.lock().expect("contract mutex poisoned");
        let stored = guard
            .get(&contract.id)
            .ok_or(ContractRepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(ContractRepositoryError::StalePrecondition {
                expected,
                found: stored.status,
            });
        }
        guard.insert(contract.id.clone(), contract.clone());
        Ok(contract)
    }

    fn list_by_status(
        &self,
        status: ContractStatus,
    ) -> Result<Vec<Contract>, ContractRepositoryError> {
        let guard = self.records.lock().expect("contract mutex poisoned");
        Ok(guard
            .values()
            .filter(|contract| contract.status == status)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationRepository {
    records: Arc<Mutex<Vec<UserNotification>>>,
}

impl NotificationRepository for InMemoryNotificationRepository {
    fn create(&self, notification: UserNotification) -> Result<UserNotification, NotificationError> {
        let mut guard = self.records.lock().expect("notification mutex poisoned");
        guard.push(notification.clone());
        Ok(notification)
    }

    fn for_user(&self, user: &UserId) -> Result<Vec<UserNotification>, NotificationError> {
        let guard = self.records.lock().expect("notification mutex poisoned");
        Ok(guard
            .iter()
            .filter(|notification| notification.user_id == *user)
            .cloned()
            .collect())
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

/// Directory seeded with demo projects and profiles until the platform
/// database adapters are wired in.
#[derive(Clone)]
pub(crate) struct SeedDirectory {
    projects: Arc<HashMap<ProjectId, ProjectSnapshot>>,
    professionals: Arc<HashMap<ProfessionalId, ProfessionalProfile>>,
    companies: Arc<HashMap<CompanyId, CompanyProfile>>,
}

impl Default for SeedDirectory {
    fn default() -> Self {
        let mut projects = HashMap::new();
        projects.insert(
            ProjectId("prj-torre".to_string()),
            ProjectSnapshot {
                id: ProjectId("prj-torre".to_string()),
                title: "Torre Eurosky".to_string(),
                company_id: CompanyId("company-7".to_string()),
                start_date: NaiveDate::from_ymd_opt(2025, 4, 1),
                end_date: NaiveDate::from_ymd_opt(2025, 12, 31),
                deliverables: vec![
                    "Modello architettonico LOD 300".to_string(),
                    "Coordinamento interferenze MEP".to_string(),
                ],
            },
        );
        projects.insert(
            ProjectId("prj-ponte".to_string()),
            ProjectSnapshot {
                id: ProjectId("prj-ponte".to_string()),
                title: "Ponte sul Ticino".to_string(),
                company_id: CompanyId("company-12".to_string()),
                start_date: NaiveDate::from_ymd_opt(2025, 6, 1),
                end_date: NaiveDate::from_ymd_opt(2026, 5, 31),
                deliverables: vec!["Modello strutturale federato".to_string()],
            },
        );

        let mut professionals = HashMap::new();
        professionals.insert(
            ProfessionalId("prof-42".to_string()),
            ProfessionalProfile {
                id: ProfessionalId("prof-42".to_string()),
                display_name: "Maria Rossi".to_string(),
                vat_number: Some("01234567890".to_string()),
                fiscal_code: Some("RSSMRA80A01H501U".to_string()),
                fiscal_address: Some("Via Roma 1, Milano".to_string()),
            },
        );

        let mut companies = HashMap::new();
        companies.insert(
            CompanyId("company-7".to_string()),
            CompanyProfile {
                id: CompanyId("company-7".to_string()),
                display_name: "Edilizia Meridiana S.r.l.".to_string(),
                vat_number: Some("09876543210".to_string()),
                legal_representative: Some("Giovanni Bianchi".to_string()),
                legal_address: Some("Corso Buenos Aires 20, Milano".to_string()),
            },
        );
        companies.insert(
            CompanyId("company-12".to_string()),
            CompanyProfile {
                id: CompanyId("company-12".to_string()),
                display_name: "Infrastrutture Padane S.p.A.".to_string(),
                vat_number: Some("11223344556".to_string()),
                legal_representative: Some("Lucia Verdi".to_string()),
                legal_address: Some("Via Cavour 3, Pavia".to_string()),
            },
        );

        Self {
            projects: Arc::new(projects),
            professionals: Arc::new(professionals),
            companies: Arc::new(companies),
        }
    }
}

impl ProjectDirectory for SeedDirectory {
    fn project(&self, id: &ProjectId) -> Result<Option<ProjectSnapshot>, DirectoryError> {
        Ok(self.projects.get(id).cloned())
    }

    fn professional(
        &self,
        id: &ProfessionalId,
    ) -> Result<Option<ProfessionalProfile>, DirectoryError> {
        Ok(self.professionals.get(id).cloned())
    }

    fn company(&self, id: &CompanyId) -> Result<Option<CompanyProfile>, DirectoryError> {
        Ok(self.companies.get(id).cloned())
    }
}

/// Offline stand-in for the text collaborator: deterministic contract body
/// with the mandatory clauses, 12 numbered articles, and enough prose to
/// clear the validator. Lets `serve` and `demo` run without a model key.
#[derive(Default, Clone)]
pub(crate) struct CannedTextGenerator;

impl TextGenerator for CannedTextGenerator {
    fn generate(&self, prompt: &str, _params: GenerationParams) -> Result<String, GenerationError> {
        // Keep the facts the template inlined so the output reads coherent.
        let facts: String = prompt
            .lines()
            .filter(|line| line.contains(':'))
            .collect::<Vec<_>>()
            .join(" ");

        let mut text = format!(
            "CONTRATTO DI COLLABORAZIONE PROFESSIONALE. Premesso quanto segue: {facts} Le \
             parti, come sopra identificate con Partita IVA e Codice Fiscale, convengono e \
             stipulano quanto segue. "
        );

        let articles = [
            "Oggetto dell'incarico",
            "Durata dell'incarico",
            "Compenso e modalità di pagamento",
            "Obblighi del professionista",
            "Obblighi del committente",
            "Diritto di recesso",
            "Protezione dei dati personali",
            "Proprietà intellettuale sugli elaborati",
            "Riservatezza",
            "Responsabilità e coperture assicurative",
            "Foro competente",
            "Disposizioni finali",
        ];
        for (index, title) in articles.iter().enumerate() {
            text.push_str(&format!(
                "Art. {} - {title}. Le parti regolano il presente aspetto del rapporto di \
                 collaborazione secondo quanto concordato in sede di negoziazione e nel \
                 rispetto della normativa vigente. ",
                index + 1
            ));
        }
        text.push_str(
            "Firme. Il Professionista e il Committente sottoscrivono il presente contratto \
             in segno di integrale accettazione. ",
        );

        while text.split_whitespace().count() < 1100 {
            text.push_str("Le parti danno atto di quanto sopra. ");
        }
        Ok(text)
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
