use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::ValidatedEmployee;
use super::identity::IdentityHandle;

/// Persisted employee record: the validated submission plus the identity
/// reference and a generation timestamp. Owned by the external store once
/// written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee: ValidatedEmployee,
    pub identity: IdentityHandle,
    pub recorded_at: DateTime<Utc>,
}

impl EmployeeRecord {
    pub fn listing_view(&self) -> EmployeeListingView {
        EmployeeListingView {
            employee_id: self.identity.0.clone(),
            name: self.employee.name.clone(),
            email: self.employee.email.clone(),
            company_id: self.employee.company_id.clone(),
            role: self.employee.role.label(),
            recorded_at: self.recorded_at,
        }
    }
}

/// Row shape consumed by the employee listing the UI navigates to after a
/// successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeListingView {
    pub employee_id: String,
    pub name: String,
    pub email: String,
    pub company_id: String,
    pub role: &'static str,
    pub recorded_at: DateTime<Utc>,
}

/// Storage seam for employee records. Implementations must enforce
/// national-id uniqueness themselves; the client-side lookup alone cannot
/// close the race between concurrent submissions.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Insert one record into the named collection. Exactly one attempt per
    /// invocation; no internal retries.
    async fn insert(
        &self,
        collection: &str,
        record: EmployeeRecord,
    ) -> Result<EmployeeRecord, RepositoryError>;

    async fn list(&self, collection: &str) -> Result<Vec<EmployeeRecord>, RepositoryError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
