//! Loaner device pool endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        loan::LoanDetails,
        loaner::{CreateLoanerDevice, LoanerDevice, UpdateLoanerDevice},
    },
};

use super::AuthenticatedTechnician;

/// List the loaner device fleet
#[utoipa::path(
    get,
    path = "/loaner-devices",
    tag = "loaners",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Loaner device list", body = Vec<LoanerDevice>)
    )
)]
pub async fn list_loaners(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
) -> AppResult<Json<Vec<LoanerDevice>>> {
    let devices = state.services.loaners.list().await?;
    Ok(Json(devices))
}

/// List loaner devices currently available
#[utoipa::path(
    get,
    path = "/loaner-devices/available",
    tag = "loaners",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Available loaner devices", body = Vec<LoanerDevice>)
    )
)]
pub async fn list_available_loaners(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
) -> AppResult<Json<Vec<LoanerDevice>>> {
    let devices = state.services.loaners.list_available().await?;
    Ok(Json(devices))
}

/// Get loaner device by ID
#[utoipa::path(
    get,
    path = "/loaner-devices/{id}",
    tag = "loaners",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loaner device ID")),
    responses(
        (status = 200, description = "Loaner device details", body = LoanerDevice),
        (status = 404, description = "Loaner device not found")
    )
)]
pub async fn get_loaner(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanerDevice>> {
    let device = state.services.loaners.get_by_id(id).await?;
    Ok(Json(device))
}

/// Create a loaner device
#[utoipa::path(
    post,
    path = "/loaner-devices",
    tag = "loaners",
    security(("bearer_auth" = [])),
    request_body = CreateLoanerDevice,
    responses(
        (status = 201, description = "Loaner device created", body = LoanerDevice),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_loaner(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Json(data): Json<CreateLoanerDevice>,
) -> AppResult<(StatusCode, Json<LoanerDevice>)> {
    let device = state.services.loaners.create(&data).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

/// Update a loaner device
#[utoipa::path(
    put,
    path = "/loaner-devices/{id}",
    tag = "loaners",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loaner device ID")),
    request_body = UpdateLoanerDevice,
    responses(
        (status = 200, description = "Loaner device updated", body = LoanerDevice),
        (status = 400, description = "Invalid status value"),
        (status = 404, description = "Loaner device not found"),
        (status = 409, description = "Device has an open loan")
    )
)]
pub async fn update_loaner(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
    Json(data): Json<UpdateLoanerDevice>,
) -> AppResult<Json<LoanerDevice>> {
    let device = state.services.loaners.update(id, &data).await?;
    Ok(Json(device))
}

/// Delete a loaner device
#[utoipa::path(
    delete,
    path = "/loaner-devices/{id}",
    tag = "loaners",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loaner device ID")),
    responses(
        (status = 204, description = "Loaner device deleted"),
        (status = 404, description = "Loaner device not found"),
        (status = 409, description = "Device has an open loan")
    )
)]
pub async fn delete_loaner(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.loaners.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Loan history for a loaner device
#[utoipa::path(
    get,
    path = "/loaner-devices/{id}/loans",
    tag = "loaners",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loaner device ID")),
    responses(
        (status = 200, description = "Loan history", body = Vec<LoanDetails>),
        (status = 404, description = "Loaner device not found")
    )
)]
pub async fn list_loaner_loans(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.list_for_device(id).await?;
    Ok(Json(loans))
}
