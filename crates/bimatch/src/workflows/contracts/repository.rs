use super::domain::{Contract, ContractId, ContractStatus};
use crate::workflows::candidacy::domain::ApplicationId;

/// Storage abstraction over the contract collection. As with applications,
/// `update_if_status` is a compare-and-swap: implementations refuse the
/// write when the stored status no longer matches `expected`.
pub trait ContractRepository: Send + Sync {
    fn insert(&self, contract: Contract) -> Result<Contract, RepositoryError>;
    fn fetch(&self, id: &ContractId) -> Result<Option<Contract>, RepositoryError>;
    fn find_by_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Option<Contract>, RepositoryError>;
    fn update_if_status(
        &self,
        expected: ContractStatus,
        contract: Contract,
    ) -> Result<Contract, RepositoryError>;
    fn list_by_status(&self, status: ContractStatus) -> Result<Vec<Contract>, RepositoryError>;
}

/// Error enumeration for contract repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("status precondition failed (expected '{expected}', found '{found}')")]
    StalePrecondition {
        expected: ContractStatus,
        found: ContractStatus,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
