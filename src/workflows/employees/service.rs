use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::ProvisioningConfig;

use super::directory::{CompanyDirectory, DirectoryError};
use super::domain::{Company, EmployeeDraft};
use super::events::{EmployeeEvent, EmployeeEvents};
use super::identity::{IdentityHandle, IdentityProvisioner, ProvisionError};
use super::repository::{EmployeeRecord, EmployeeRepository, RepositoryError};
use super::validation::{EmployeeField, FieldErrors, NationalIdLookup, ValidationEngine};

/// Orchestrates one employee submission: local rules, the awaited
/// uniqueness stage, login creation, and the single record write.
///
/// Steps run strictly in sequence; the repository is never touched when the
/// provisioner fails, and a failed write triggers retraction of the login
/// created moments earlier.
pub struct EmployeeProvisioningService<D, L, I, R> {
    engine: ValidationEngine,
    directory: Arc<D>,
    lookup: Arc<L>,
    identity: Arc<I>,
    repository: Arc<R>,
    events: EmployeeEvents,
    collection: String,
    in_flight: AtomicBool,
}

/// Outcome handed back for a fully provisioned employee. The one-time
/// secret appears here and nowhere else.
#[derive(Debug, Clone)]
pub struct ProvisionReceipt {
    pub identity: IdentityHandle,
    pub one_time_secret: String,
    pub recorded_at: DateTime<Utc>,
}

/// Error raised by the provisioning pipeline. Identity-stage and
/// write-stage failures stay distinct so callers can tell the safe-retry
/// path from one that may have left an orphaned login behind.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("another submission is already in flight")]
    InFlight,
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("submission failed validation: {0}")]
    Validation(FieldErrors),
    #[error("login creation failed: {0}")]
    Identity(#[from] ProvisionError),
    #[error("record write failed: {source}")]
    Write {
        source: RepositoryError,
        /// Whether the compensating retraction of the just-created login
        /// succeeded. `false` means the identity is orphaned at the backend.
        identity_retracted: bool,
    },
}

impl<D, L, I, R> EmployeeProvisioningService<D, L, I, R>
where
    D: CompanyDirectory + 'static,
    L: NationalIdLookup + 'static,
    I: IdentityProvisioner + 'static,
    R: EmployeeRepository + 'static,
{
    pub fn new(
        directory: Arc<D>,
        lookup: Arc<L>,
        identity: Arc<I>,
        repository: Arc<R>,
        config: &ProvisioningConfig,
    ) -> Self {
        Self {
            engine: ValidationEngine::new(),
            directory,
            lookup,
            identity,
            repository,
            events: EmployeeEvents::default(),
            collection: config.collection.clone(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Channel carrying `EmployeeEvent::Recorded` notifications from the
    /// write path. Listing views subscribe here instead of polling a flag.
    pub fn events(&self) -> &EmployeeEvents {
        &self.events
    }

    /// Reference data for the company-selection field.
    pub async fn companies(&self) -> Result<Vec<Company>, DirectoryError> {
        self.directory.companies().await
    }

    /// Records for the listing view the UI lands on after a success.
    pub async fn list(&self) -> Result<Vec<EmployeeRecord>, RepositoryError> {
        self.repository.list(&self.collection).await
    }

    /// Run the full pipeline for one draft.
    ///
    /// Re-entry while a submission is suspended at an I/O boundary returns
    /// `InFlight` without touching any backend; the guard clears on every
    /// exit path. There is no cancellation or timeout once the pipeline has
    /// started.
    pub async fn submit(&self, draft: EmployeeDraft) -> Result<ProvisionReceipt, SubmitError> {
        let _guard = SubmissionGuard::acquire(&self.in_flight).ok_or(SubmitError::InFlight)?;

        let companies = self.directory.companies().await?;
        self.engine
            .check(&draft, &companies)
            .map_err(SubmitError::Validation)?;

        // Uniqueness only runs once the local pattern rule has passed, and
        // an unreachable index fails closed rather than passing as unique.
        match self.lookup.exists(&draft.national_id).await {
            Ok(false) => {}
            Ok(true) => {
                return Err(SubmitError::Validation(FieldErrors::single(
                    EmployeeField::NationalId,
                    "this national id is already registered",
                )));
            }
            Err(err) => {
                warn!(error = %err, "national id uniqueness check failed");
                return Err(SubmitError::Validation(FieldErrors::single(
                    EmployeeField::NationalId,
                    "could not verify national id uniqueness, try again",
                )));
            }
        }

        let employee = self.engine.accept(draft);
        let provisioned = self.identity.provision(&employee.email).await?;

        let record = EmployeeRecord {
            employee,
            identity: provisioned.handle.clone(),
            recorded_at: Utc::now(),
        };

        match self.repository.insert(&self.collection, record).await {
            Ok(stored) => {
                info!(
                    employee_id = %stored.identity.0,
                    company_id = %stored.employee.company_id,
                    "employee provisioned"
                );
                self.events.publish(EmployeeEvent::Recorded {
                    employee_id: stored.identity.0.clone(),
                    national_id: stored.employee.national_id.clone(),
                    company_id: stored.employee.company_id.clone(),
                });
                Ok(ProvisionReceipt {
                    identity: provisioned.handle,
                    one_time_secret: provisioned.one_time_secret,
                    recorded_at: stored.recorded_at,
                })
            }
            Err(source) => {
                let identity_retracted = match self.identity.retract(&provisioned.handle).await {
                    Ok(()) => true,
                    Err(err) => {
                        warn!(
                            handle = %provisioned.handle.0,
                            error = %err,
                            "login retraction failed after write failure; identity orphaned"
                        );
                        false
                    }
                };
                Err(SubmitError::Write {
                    source,
                    identity_retracted,
                })
            }
        }
    }
}

/// Mutual-exclusion token for one submission. Acquired with a
/// compare-exchange so only one pipeline per service instance runs at a
/// time; dropping it returns the service to idle.
struct SubmissionGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SubmissionGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
