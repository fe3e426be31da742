use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::directory::CompanyDirectory;
use super::domain::EmployeeDraft;
use super::identity::{IdentityProvisioner, ProvisionError};
use super::repository::{EmployeeRepository, RepositoryError};
use super::service::{EmployeeProvisioningService, SubmitError};
use super::validation::NationalIdLookup;

/// Router builder exposing the provisioning pipeline and its reference data.
pub fn employee_router<D, L, I, R>(
    service: Arc<EmployeeProvisioningService<D, L, I, R>>,
) -> Router
where
    D: CompanyDirectory + 'static,
    L: NationalIdLookup + 'static,
    I: IdentityProvisioner + 'static,
    R: EmployeeRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/employees",
            get(list_handler::<D, L, I, R>).post(submit_handler::<D, L, I, R>),
        )
        .route("/api/v1/companies", get(companies_handler::<D, L, I, R>))
        .with_state(service)
}

pub(crate) async fn submit_handler<D, L, I, R>(
    State(service): State<Arc<EmployeeProvisioningService<D, L, I, R>>>,
    axum::Json(draft): axum::Json<EmployeeDraft>,
) -> Response
where
    D: CompanyDirectory + 'static,
    L: NationalIdLookup + 'static,
    I: IdentityProvisioner + 'static,
    R: EmployeeRepository + 'static,
{
    match service.submit(draft).await {
        Ok(receipt) => {
            let payload = json!({
                "employee_id": receipt.identity.0,
                "one_time_secret": receipt.one_time_secret,
                "recorded_at": receipt.recorded_at,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(SubmitError::Validation(errors)) => {
            let payload = json!({ "errors": errors });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(SubmitError::InFlight) => {
            let payload = json!({
                "error": "a submission is already in progress",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(SubmitError::Identity(ProvisionError::EmailTaken)) => {
            let payload = json!({
                "error": "this email already has a login",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(SubmitError::Identity(ProvisionError::InvalidEmail)) => {
            let payload = json!({
                "error": "the identity backend rejected this email",
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(SubmitError::Identity(err)) => {
            let payload = json!({
                "error": "could not create the employee login",
                "detail": err.to_string(),
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Err(SubmitError::Write {
            source: RepositoryError::Conflict,
            identity_retracted,
        }) => {
            let payload = json!({
                "error": "an employee with this national id already exists",
                "identity_retracted": identity_retracted,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        Err(SubmitError::Write {
            source,
            identity_retracted,
        }) => {
            let payload = json!({
                "error": "could not save the employee record",
                "detail": source.to_string(),
                "identity_retracted": identity_retracted,
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Err(SubmitError::Directory(err)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn list_handler<D, L, I, R>(
    State(service): State<Arc<EmployeeProvisioningService<D, L, I, R>>>,
) -> Response
where
    D: CompanyDirectory + 'static,
    L: NationalIdLookup + 'static,
    I: IdentityProvisioner + 'static,
    R: EmployeeRepository + 'static,
{
    match service.list().await {
        Ok(records) => {
            let views: Vec<_> = records.iter().map(|record| record.listing_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn companies_handler<D, L, I, R>(
    State(service): State<Arc<EmployeeProvisioningService<D, L, I, R>>>,
) -> Response
where
    D: CompanyDirectory + 'static,
    L: NationalIdLookup + 'static,
    I: IdentityProvisioner + 'static,
    R: EmployeeRepository + 'static,
{
    match service.companies().await {
        Ok(companies) => (StatusCode::OK, axum::Json(companies)).into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
    }
}
