use serde::{Deserialize, Serialize};

/// Raw form submission for one employee, exactly as the admin typed it.
/// Formatted fields keep their input masks (`DD/MM/YYYY`, `NNN.NNN.NNN-NN`,
/// `(NN) NNNNN-NNNN`) and are only trusted after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDraft {
    pub name: String,
    pub birth_date: String,
    pub address: String,
    pub national_id: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub household_size: Option<String>,
    pub company_id: String,
}

/// Immutable snapshot of a draft that passed every rule, including the
/// remote national-id uniqueness stage. Assembled by the validation engine
/// only; downstream code never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedEmployee {
    pub name: String,
    pub birth_date: String,
    pub address: String,
    pub national_id: String,
    pub email: String,
    pub phone: String,
    pub household_size: Option<u32>,
    pub company_id: String,
    pub role: EmployeeRole,
}

/// Role attached to every provisioned employee login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    User,
}

impl EmployeeRole {
    pub const fn label(self) -> &'static str {
        match self {
            EmployeeRole::User => "user",
        }
    }
}

/// Reference entry for the company-selection field and the foreign-key rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub label: String,
}
