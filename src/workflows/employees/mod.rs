//! Employee provisioning pipeline: draft validation, login creation, and
//! the single guarded record write, sequenced by one orchestrating service.
//!
//! External collaborators (uniqueness index, identity backend, store, and
//! company directory) sit behind async traits so the pipeline can be
//! exercised end to end with in-process doubles.

pub mod directory;
pub mod domain;
pub mod events;
pub mod identity;
pub mod repository;
pub mod router;
pub(crate) mod rules;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use directory::{CompanyDirectory, DirectoryError};
pub use domain::{Company, EmployeeDraft, EmployeeRole, ValidatedEmployee};
pub use events::{EmployeeEvent, EmployeeEvents};
pub use identity::{
    generate_one_time_secret, IdentityHandle, IdentityProvisioner, ProvisionError,
    ProvisionedIdentity,
};
pub use repository::{EmployeeListingView, EmployeeRecord, EmployeeRepository, RepositoryError};
pub use router::employee_router;
pub use service::{EmployeeProvisioningService, ProvisionReceipt, SubmitError};
pub use validation::{
    EmployeeField, FieldErrors, LookupError, NationalIdLookup, ValidationEngine,
};
