use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::workflows::candidacy::domain::{
    ApplicationId, ApplicationStatus, ApplicationSubmission, CompanyId, ProfessionalId,
    ProjectApplication, ProjectId,
};
use crate::workflows::candidacy::repository::{ApplicationRepository, RepositoryError};
use crate::workflows::candidacy::service::CandidacyService;
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

pub(super) fn submission() -> ApplicationSubmission {
    let mut skills = BTreeSet::new();
    skills.insert("Revit".to_string());
    skills.insert("Coordinamento MEP".to_string());
    ApplicationSubmission {
        project_id: ProjectId(PROJECT_ID.to_string()),
        professional_id: ProfessionalId(PROFESSIONAL_ID.to_string()),
        cover_letter_message: "Dieci anni di esperienza su progetti direzionali.".to_string(),
        relevant_skills: skills,
        availability_notes: Some("Disponibile da aprile".to_string()),
    }
}

pub(super) fn company_user() -> UserId {
    UserId(COMPANY_ID.to_string())
}

pub(super) fn professional_user() -> UserId {
    UserId(PROFESSIONAL_ID.to_string())
}

#[derive(Default, Clone)]
pub(super) struct MemoryApplications {
    records: Arc<Mutex<HashMap<ApplicationId, ProjectApplication>>>,
}

impl ApplicationRepository for MemoryApplications {
    fn insert(
        &self,
        application: ProjectApplication,
    ) -> Result<ProjectApplication, RepositoryError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ProjectApplication>, RepositoryError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_for_project_and_professional(
        &self,
        project: &ProjectId,
        professional: &ProfessionalId,
    ) -> Result<Option<ProjectApplication>, RepositoryError> {
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
    ) -> Result<ProjectApplication, RepositoryError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        let stored = guard
            .get(&application.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(RepositoryError::StalePrecondition {
                expected,
                found: stored.status,
            });
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn delete(&self, id: &ApplicationId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }

    fn for_project(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<ProjectApplication>, RepositoryError> {
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
    ) -> Result<Vec<ProjectApplication>, RepositoryError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard
            .values()
            .filter(|application| application.professional_id == *professional)
            .cloned()
            .collect())
    }
}

impl MemoryApplications {
    /// Flip the stored status underneath the service, simulating a racing
    /// actor writing between the caller's read and write.
    pub(super) fn overwrite_status(&self, id: &ApplicationId, status: ApplicationStatus) {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        if let Some(application) = guard.get_mut(id) {
            application.status = status;
        }
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    records: Arc<Mutex<Vec<UserNotification>>>,
    fail_next: Arc<AtomicBool>,
}

impl MemoryNotifications {
    pub(super) fn all(&self) -> Vec<UserNotification> {
        self.records.lock().expect("notification mutex poisoned").clone()
    }

    pub(super) fn for_recipient(&self, user: &UserId) -> Vec<UserNotification> {
        self.all()
            .into_iter()
            .filter(|notification| notification.user_id == *user)
            .collect()
    }

    /// Make the next `create` call fail, then recover.
    pub(super) fn fail_next_create(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl NotificationRepository for MemoryNotifications {
    fn create(&self, notification: UserNotification) -> Result<UserNotification, NotificationError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(NotificationError::Unavailable("store offline".to_string()));
        }
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
    pub(super) fn with_project(snapshot: ProjectSnapshot) -> Self {
        let directory = Self::default();
        directory
            .projects
            .lock()
            .expect("directory mutex poisoned")
            .insert(snapshot.id.clone(), snapshot);
        directory
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

pub(super) type TestService = CandidacyService<MemoryApplications, MemoryNotifications, StaticDirectory>;

pub(super) fn build_service() -> (
    Arc<TestService>,
    Arc<MemoryApplications>,
    Arc<MemoryNotifications>,
) {
    let repository = Arc::new(MemoryApplications::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let directory = Arc::new(StaticDirectory::with_project(project()));
    let service = Arc::new(CandidacyService::new(
        repository.clone(),
        notifications.clone(),
        directory,
    ));
    (service, repository, notifications)
}

/// Submit and walk the candidacy to `colloquio_proposto`.
pub(super) fn proposed_application(service: &TestService) -> ApplicationId {
    let receipt = service.submit(submission()).expect("submission accepted");
    let id = receipt.application.id.clone();
    service.preselect(&id).expect("preselection succeeds");
    service
        .propose_interview(
            &id,
            crate::workflows::candidacy::interview::InterviewProposal {
                message: "Colloquio conoscitivo".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date"),
            },
        )
        .expect("proposal succeeds");
    id
}
