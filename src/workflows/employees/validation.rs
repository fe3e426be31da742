use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::{Company, EmployeeDraft, EmployeeRole, ValidatedEmployee};
use super::rules;

/// Form fields the rule set can report errors against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeField {
    Name,
    BirthDate,
    Address,
    NationalId,
    Email,
    Phone,
    HouseholdSize,
    CompanyId,
}

impl EmployeeField {
    pub const fn key(self) -> &'static str {
        match self {
            EmployeeField::Name => "name",
            EmployeeField::BirthDate => "birth_date",
            EmployeeField::Address => "address",
            EmployeeField::NationalId => "national_id",
            EmployeeField::Email => "email",
            EmployeeField::Phone => "phone",
            EmployeeField::HouseholdSize => "household_size",
            EmployeeField::CompanyId => "company_id",
        }
    }
}

/// Field-keyed validation failures, ready to be surfaced inline by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<EmployeeField, String>,
}

impl FieldErrors {
    pub fn single(field: EmployeeField, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message.into());
        errors
    }

    pub fn insert(&mut self, field: EmployeeField, message: String) {
        self.errors.insert(field, message);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn contains(&self, field: EmployeeField) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn message(&self, field: EmployeeField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = EmployeeField> + '_ {
        self.errors.keys().copied()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field.key(), message)?;
            first = false;
        }
        Ok(())
    }
}

/// Side-effect-free rule engine for employee drafts.
///
/// The engine only evaluates the local rule set; the remote national-id
/// uniqueness stage stays with the orchestrator so the rules here remain
/// synchronous and testable in isolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationEngine;

impl ValidationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate all local rules. Returns exactly the failing fields.
    pub fn check(
        &self,
        draft: &EmployeeDraft,
        companies: &[Company],
    ) -> Result<(), FieldErrors> {
        let errors = rules::check_draft(draft, companies);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Freeze a draft into the immutable submission snapshot, attaching the
    /// fixed role. Callers must have run `check` and the uniqueness stage
    /// first; the orchestrator owns that ordering.
    pub(crate) fn accept(&self, draft: EmployeeDraft) -> ValidatedEmployee {
        let household_size =
            rules::household_size_input(&draft).and_then(|value| value.parse::<u32>().ok());

        ValidatedEmployee {
            name: draft.name,
            birth_date: draft.birth_date,
            address: draft.address,
            national_id: draft.national_id,
            email: draft.email.trim().to_string(),
            phone: draft.phone,
            household_size,
            company_id: draft.company_id,
            role: EmployeeRole::User,
        }
    }
}

/// Remote index consulted to keep national ids unique across the system.
///
/// The orchestrator only calls this after the id's local pattern rule has
/// passed, and treats transport failures as "not unique" (fail-closed).
#[async_trait]
pub trait NationalIdLookup: Send + Sync {
    async fn exists(&self, national_id: &str) -> Result<bool, LookupError>;
}

/// Uniqueness service failure.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("uniqueness service unreachable: {0}")]
    Unreachable(String),
}
