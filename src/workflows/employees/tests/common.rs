use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use crate::config::ProvisioningConfig;
use crate::workflows::employees::directory::{CompanyDirectory, DirectoryError};
use crate::workflows::employees::domain::{Company, EmployeeDraft};
use crate::workflows::employees::identity::{
    IdentityHandle, IdentityProvisioner, ProvisionError, ProvisionedIdentity,
};
use crate::workflows::employees::repository::{
    EmployeeRecord, EmployeeRepository, RepositoryError,
};
use crate::workflows::employees::service::EmployeeProvisioningService;
use crate::workflows::employees::validation::{LookupError, NationalIdLookup};

pub(super) fn companies() -> Vec<Company> {
    vec![
        Company {
            id: "c1".to_string(),
            label: "Acme Logistics".to_string(),
        },
        Company {
            id: "c2".to_string(),
            label: "Borealis Foods".to_string(),
        },
    ]
}

pub(super) fn draft() -> EmployeeDraft {
    EmployeeDraft {
        name: "Ana Silva".to_string(),
        birth_date: "01/01/1990".to_string(),
        address: "Rua X, 123".to_string(),
        national_id: "123.456.789-09".to_string(),
        email: "ana@x.com".to_string(),
        phone: "(11) 91234-5678".to_string(),
        household_size: None,
        company_id: "c1".to_string(),
    }
}

pub(super) fn provisioning_config() -> ProvisioningConfig {
    ProvisioningConfig::default()
}

#[derive(Clone)]
pub(super) struct FixedDirectory {
    companies: Vec<Company>,
}

impl Default for FixedDirectory {
    fn default() -> Self {
        Self {
            companies: companies(),
        }
    }
}

#[async_trait]
impl CompanyDirectory for FixedDirectory {
    async fn companies(&self) -> Result<Vec<Company>, DirectoryError> {
        Ok(self.companies.clone())
    }
}

pub(super) enum LookupResponse {
    Unique,
    Exists,
    Error,
}

pub(super) struct StubLookup {
    response: LookupResponse,
    calls: AtomicUsize,
}

impl StubLookup {
    pub(super) fn unique() -> Self {
        Self::with_response(LookupResponse::Unique)
    }

    pub(super) fn existing() -> Self {
        Self::with_response(LookupResponse::Exists)
    }

    pub(super) fn failing() -> Self {
        Self::with_response(LookupResponse::Error)
    }

    fn with_response(response: LookupResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NationalIdLookup for StubLookup {
    async fn exists(&self, _national_id: &str) -> Result<bool, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.response {
            LookupResponse::Unique => Ok(false),
            LookupResponse::Exists => Ok(true),
            LookupResponse::Error => Err(LookupError::Unreachable("timeout".to_string())),
        }
    }
}

/// Lookup that suspends until released, so tests can hold a submission at
/// an I/O boundary and probe the in-flight guard.
pub(super) struct GatedLookup {
    pub(super) entered: Arc<Notify>,
    pub(super) release: Arc<Notify>,
}

impl GatedLookup {
    pub(super) fn new() -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl NationalIdLookup for GatedLookup {
    async fn exists(&self, _national_id: &str) -> Result<bool, LookupError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(false)
    }
}

pub(super) struct StubIdentity {
    provision_error: Option<fn() -> ProvisionError>,
    retract_fails: bool,
    sequence: AtomicUsize,
    provisioned: Mutex<Vec<String>>,
    retracted: Mutex<Vec<IdentityHandle>>,
}

impl StubIdentity {
    pub(super) fn ok() -> Self {
        Self::build(None, false)
    }

    pub(super) fn email_taken() -> Self {
        Self::build(Some(|| ProvisionError::EmailTaken), false)
    }

    pub(super) fn unavailable() -> Self {
        Self::build(
            Some(|| ProvisionError::Unavailable("backend offline".to_string())),
            false,
        )
    }

    pub(super) fn retract_failing() -> Self {
        Self::build(None, true)
    }

    fn build(provision_error: Option<fn() -> ProvisionError>, retract_fails: bool) -> Self {
        Self {
            provision_error,
            retract_fails,
            sequence: AtomicUsize::new(1),
            provisioned: Mutex::new(Vec::new()),
            retracted: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn provisioned(&self) -> Vec<String> {
        self.provisioned.lock().expect("identity mutex").clone()
    }

    pub(super) fn retracted(&self) -> Vec<IdentityHandle> {
        self.retracted.lock().expect("identity mutex").clone()
    }
}

#[async_trait]
impl IdentityProvisioner for StubIdentity {
    async fn provision(&self, email: &str) -> Result<ProvisionedIdentity, ProvisionError> {
        if let Some(error) = self.provision_error {
            return Err(error());
        }
        let id = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.provisioned
            .lock()
            .expect("identity mutex")
            .push(email.to_string());
        Ok(ProvisionedIdentity {
            handle: IdentityHandle(format!("login-{id:04}")),
            one_time_secret: format!("secret-{id:04}"),
        })
    }

    async fn retract(&self, handle: &IdentityHandle) -> Result<(), ProvisionError> {
        if self.retract_fails {
            return Err(ProvisionError::Unavailable("backend offline".to_string()));
        }
        self.retracted
            .lock()
            .expect("identity mutex")
            .push(handle.clone());
        Ok(())
    }
}

pub(super) enum WriteBehavior {
    Ok,
    Conflict,
    Unavailable,
}

pub(super) struct StubRepository {
    behavior: WriteBehavior,
    inserts: AtomicUsize,
    records: Mutex<Vec<EmployeeRecord>>,
}

impl StubRepository {
    pub(super) fn ok() -> Self {
        Self::with_behavior(WriteBehavior::Ok)
    }

    pub(super) fn conflicting() -> Self {
        Self::with_behavior(WriteBehavior::Conflict)
    }

    pub(super) fn unavailable() -> Self {
        Self::with_behavior(WriteBehavior::Unavailable)
    }

    fn with_behavior(behavior: WriteBehavior) -> Self {
        Self {
            behavior,
            inserts: AtomicUsize::new(0),
            records: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub(super) fn records(&self) -> Vec<EmployeeRecord> {
        self.records.lock().expect("repository mutex").clone()
    }
}

#[async_trait]
impl EmployeeRepository for StubRepository {
    async fn insert(
        &self,
        _collection: &str,
        record: EmployeeRecord,
    ) -> Result<EmployeeRecord, RepositoryError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            WriteBehavior::Ok => {
                self.records
                    .lock()
                    .expect("repository mutex")
                    .push(record.clone());
                Ok(record)
            }
            WriteBehavior::Conflict => Err(RepositoryError::Conflict),
            WriteBehavior::Unavailable => {
                Err(RepositoryError::Unavailable("store offline".to_string()))
            }
        }
    }

    async fn list(&self, _collection: &str) -> Result<Vec<EmployeeRecord>, RepositoryError> {
        Ok(self.records())
    }
}

pub(super) type StubService<L> =
    EmployeeProvisioningService<FixedDirectory, L, StubIdentity, StubRepository>;

pub(super) fn build_service<L: NationalIdLookup + 'static>(
    lookup: Arc<L>,
    identity: Arc<StubIdentity>,
    repository: Arc<StubRepository>,
) -> StubService<L> {
    EmployeeProvisioningService::new(
        Arc::new(FixedDirectory::default()),
        lookup,
        identity,
        repository,
        &provisioning_config(),
    )
}

pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
