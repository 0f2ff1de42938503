use super::domain::{ApplicationId, ApplicationStatus, ProfessionalId, ProjectApplication, ProjectId};

/// Storage abstraction over the application collection.
///
/// `update_if_status` is the compare-and-swap the whole engine leans on:
/// implementations must compare the stored status against `expected` and
/// refuse the write when they differ, so racing actors surface as
/// `StalePrecondition` instead of lost updates.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: ProjectApplication)
        -> Result<ProjectApplication, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ProjectApplication>, RepositoryError>;
    fn find_for_project_and_professional(
        &self,
        project: &ProjectId,
        professional: &ProfessionalId,
    ) -> Result<Option<ProjectApplication>, RepositoryError>;
    fn update_if_status(
        &self,
        expected: ApplicationStatus,
        application: ProjectApplication,
    ) -> Result<ProjectApplication, RepositoryError>;
    fn delete(&self, id: &ApplicationId) -> Result<(), RepositoryError>;
    fn for_project(&self, project: &ProjectId) -> Result<Vec<ProjectApplication>, RepositoryError>;
    fn for_professional(
        &self,
        professional: &ProfessionalId,
    ) -> Result<Vec<ProjectApplication>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("status precondition failed (expected '{expected}', found '{found}')")]
    StalePrecondition {
        expected: ApplicationStatus,
        found: ApplicationStatus,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
