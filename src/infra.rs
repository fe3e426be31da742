//! In-memory adapters for the provisioning seams. They back local runs of
//! the server and the end-to-end tests; production deployments swap in real
//! identity/store clients behind the same traits.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::workflows::employees::{
    generate_one_time_secret, Company, CompanyDirectory, DirectoryError, EmployeeRecord,
    EmployeeRepository, IdentityHandle, IdentityProvisioner, LookupError, NationalIdLookup,
    ProvisionError, ProvisionedIdentity, RepositoryError,
};

/// Static company list standing in for the reference-data service.
#[derive(Debug, Clone)]
pub struct InMemoryCompanyDirectory {
    companies: Vec<Company>,
}

impl InMemoryCompanyDirectory {
    pub fn new(companies: Vec<Company>) -> Self {
        Self { companies }
    }

    /// Demo entries for local runs.
    pub fn seeded() -> Self {
        Self::new(seed_companies())
    }
}

/// Demo company list shared by the server and the validate CLI.
pub fn seed_companies() -> Vec<Company> {
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

#[async_trait]
impl CompanyDirectory for InMemoryCompanyDirectory {
    async fn companies(&self) -> Result<Vec<Company>, DirectoryError> {
        Ok(self.companies.clone())
    }
}

/// Store keyed by national id, doubling as the uniqueness index so a
/// recorded employee is immediately visible to the remote check.
#[derive(Default, Clone)]
pub struct InMemoryEmployeeStore {
    records: Arc<Mutex<HashMap<String, EmployeeRecord>>>,
}

#[async_trait]
impl EmployeeRepository for InMemoryEmployeeStore {
    async fn insert(
        &self,
        _collection: &str,
        record: EmployeeRecord,
    ) -> Result<EmployeeRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard.contains_key(&record.employee.national_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.employee.national_id.clone(), record.clone());
        Ok(record)
    }

    async fn list(&self, _collection: &str) -> Result<Vec<EmployeeRecord>, RepositoryError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by_key(|record| record.recorded_at);
        Ok(records)
    }
}

#[async_trait]
impl NationalIdLookup for InMemoryEmployeeStore {
    async fn exists(&self, national_id: &str) -> Result<bool, LookupError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.contains_key(national_id))
    }
}

/// Identity backend that tracks logins by email.
#[derive(Default, Clone)]
pub struct InMemoryIdentityBackend {
    logins: Arc<Mutex<HashMap<String, IdentityHandle>>>,
}

impl InMemoryIdentityBackend {
    pub fn login_count(&self) -> usize {
        self.logins.lock().expect("identity mutex poisoned").len()
    }
}

#[async_trait]
impl IdentityProvisioner for InMemoryIdentityBackend {
    async fn provision(&self, email: &str) -> Result<ProvisionedIdentity, ProvisionError> {
        let mut guard = self.logins.lock().expect("identity mutex poisoned");
        if guard.contains_key(email) {
            return Err(ProvisionError::EmailTaken);
        }
        let handle = IdentityHandle(Uuid::new_v4().to_string());
        guard.insert(email.to_string(), handle.clone());
        Ok(ProvisionedIdentity {
            handle,
            one_time_secret: generate_one_time_secret(),
        })
    }

    async fn retract(&self, handle: &IdentityHandle) -> Result<(), ProvisionError> {
        let mut guard = self.logins.lock().expect("identity mutex poisoned");
        let email = guard
            .iter()
            .find(|(_, stored)| *stored == handle)
            .map(|(email, _)| email.clone());
        match email {
            Some(email) => {
                guard.remove(&email);
                Ok(())
            }
            None => Err(ProvisionError::UnknownHandle),
        }
    }
}
