use lazy_static::lazy_static;
use regex::Regex;

use super::domain::{Company, EmployeeDraft};
use super::validation::{EmployeeField, FieldErrors};

lazy_static! {
    static ref BIRTH_DATE_PATTERN: Regex =
        Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("birth date pattern compiles");
    static ref NATIONAL_ID_PATTERN: Regex =
        Regex::new(r"^\d{3}\.\d{3}\.\d{3}-\d{2}$").expect("national id pattern compiles");
    static ref PHONE_PATTERN: Regex =
        Regex::new(r"^\(\d{2}\) \d{4,5}-\d{4}$").expect("phone pattern compiles");
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles");
}

/// Evaluate every local rule against the draft. Each rule is independent;
/// the returned map holds exactly the fields that failed.
pub(crate) fn check_draft(draft: &EmployeeDraft, companies: &[Company]) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if draft.name.trim().chars().count() < 2 {
        errors.insert(
            EmployeeField::Name,
            "name must have at least 2 characters".to_string(),
        );
    }

    if !BIRTH_DATE_PATTERN.is_match(&draft.birth_date) {
        errors.insert(
            EmployeeField::BirthDate,
            "birth date must use the DD/MM/YYYY format".to_string(),
        );
    }

    if draft.address.trim().chars().count() < 5 {
        errors.insert(
            EmployeeField::Address,
            "address must have at least 5 characters".to_string(),
        );
    }

    if !NATIONAL_ID_PATTERN.is_match(&draft.national_id) {
        errors.insert(
            EmployeeField::NationalId,
            "national id must use the NNN.NNN.NNN-NN format".to_string(),
        );
    }

    if !EMAIL_PATTERN.is_match(draft.email.trim()) {
        errors.insert(
            EmployeeField::Email,
            "enter a valid email address".to_string(),
        );
    }

    if !PHONE_PATTERN.is_match(&draft.phone) {
        errors.insert(
            EmployeeField::Phone,
            "phone must use the (XX) XXXXX-XXXX format".to_string(),
        );
    }

    if let Some(size) = household_size_input(draft) {
        if size.parse::<u32>().is_err() {
            errors.insert(
                EmployeeField::HouseholdSize,
                "household size must be a number".to_string(),
            );
        }
    }

    if draft.company_id.trim().is_empty() {
        errors.insert(EmployeeField::CompanyId, "select a company".to_string());
    } else if !companies.iter().any(|company| company.id == draft.company_id) {
        errors.insert(
            EmployeeField::CompanyId,
            "selected company does not exist".to_string(),
        );
    }

    errors
}

/// The household-size field is optional; a blank string counts as absent.
pub(crate) fn household_size_input(draft: &EmployeeDraft) -> Option<&str> {
    draft
        .household_size
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
