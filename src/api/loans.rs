//! Loan ledger endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, Loan, LoanDetails, ReturnLoan},
};

use super::AuthenticatedTechnician;

/// Open loan response
#[derive(Serialize, ToSchema)]
pub struct LoanResponse {
    /// Loan ID
    pub id: i32,
    /// Loaner device now marked Prêté
    pub loaner_device_id: i32,
    /// Status message
    pub message: String,
}

/// List all loans
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Loan list with derived status", body = Vec<LoanDetails>)
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.list().await?;
    Ok(Json(loans))
}

/// Open a loan on an available loaner device
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan opened", body = LoanResponse),
        (status = 404, description = "Client, intervention or loaner device not found"),
        (status = 409, description = "Loaner device not available")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Json(data): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanResponse>)> {
    let loan = state.services.loans.open(&data).await?;

    Ok((
        StatusCode::CREATED,
        Json(LoanResponse {
            id: loan.id,
            loaner_device_id: loan.loaner_device_id,
            message: "Loaner device lent successfully".to_string(),
        }),
    ))
}

/// Return a loaner device (close the loan)
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    request_body = ReturnLoan,
    responses(
        (status = 200, description = "Loan closed", body = Loan),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(loan_id): Path<i32>,
    Json(data): Json<ReturnLoan>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.close(loan_id, &data).await?;
    Ok(Json(loan))
}
