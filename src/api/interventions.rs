//! Intervention workflow endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::intervention::{
        CommitDeposit, CreateIntervention, Intervention, InterventionQuery, PartUsage,
        RecordPartUsage, UpdateIntervention,
    },
};

use super::AuthenticatedTechnician;

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of items
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}

/// List interventions with filters and pagination
#[utoipa::path(
    get,
    path = "/interventions",
    tag = "interventions",
    security(("bearer_auth" = [])),
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("client_id" = Option<i32>, Query, description = "Filter by client"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "List of interventions", body = PaginatedResponse<Intervention>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_interventions(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Query(query): Query<InterventionQuery>,
) -> AppResult<Json<PaginatedResponse<Intervention>>> {
    let (items, total) = state.services.interventions.list(&query).await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }))
}

/// Get intervention details by ID
#[utoipa::path(
    get,
    path = "/interventions/{id}",
    tag = "interventions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Intervention ID")),
    responses(
        (status = 200, description = "Intervention details", body = Intervention),
        (status = 404, description = "Intervention not found")
    )
)]
pub async fn get_intervention(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
) -> AppResult<Json<Intervention>> {
    let intervention = state.services.interventions.get_by_id(id).await?;
    Ok(Json(intervention))
}

/// Create a new intervention
#[utoipa::path(
    post,
    path = "/interventions",
    tag = "interventions",
    security(("bearer_auth" = [])),
    request_body = CreateIntervention,
    responses(
        (status = 201, description = "Intervention created", body = Intervention),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Client or device not found"),
        (status = 409, description = "Loaner device not available")
    )
)]
pub async fn create_intervention(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Json(data): Json<CreateIntervention>,
) -> AppResult<(StatusCode, Json<Intervention>)> {
    let intervention = state.services.interventions.create(&data).await?;
    Ok((StatusCode::CREATED, Json(intervention)))
}

/// Update an intervention (partial)
#[utoipa::path(
    put,
    path = "/interventions/{id}",
    tag = "interventions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Intervention ID")),
    request_body = UpdateIntervention,
    responses(
        (status = 200, description = "Intervention updated", body = Intervention),
        (status = 404, description = "Intervention not found")
    )
)]
pub async fn update_intervention(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
    Json(data): Json<UpdateIntervention>,
) -> AppResult<Json<Intervention>> {
    let intervention = state.services.interventions.update(id, &data).await?;
    Ok(Json(intervention))
}

/// Delete an intervention
#[utoipa::path(
    delete,
    path = "/interventions/{id}",
    tag = "interventions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Intervention ID")),
    responses(
        (status = 204, description = "Intervention deleted"),
        (status = 404, description = "Intervention not found"),
        (status = 409, description = "Intervention referenced by an open loan")
    )
)]
pub async fn delete_intervention(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.interventions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Record a spare-part usage on an intervention
#[utoipa::path(
    post,
    path = "/interventions/{id}/parts",
    tag = "interventions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Intervention ID")),
    request_body = RecordPartUsage,
    responses(
        (status = 201, description = "Part usage recorded", body = PartUsage),
        (status = 404, description = "Intervention or part not found"),
        (status = 422, description = "Insufficient stock")
    )
)]
pub async fn record_part_usage(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
    Json(data): Json<RecordPartUsage>,
) -> AppResult<(StatusCode, Json<PartUsage>)> {
    let usage = state.services.interventions.record_part_usage(id, &data).await?;
    Ok((StatusCode::CREATED, Json(usage)))
}

/// Commit the workshop deposit for an intervention
#[utoipa::path(
    post,
    path = "/interventions/{id}/deposit",
    tag = "interventions",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Intervention ID")),
    request_body = CommitDeposit,
    responses(
        (status = 200, description = "Deposit recorded", body = Intervention),
        (status = 404, description = "Intervention not found"),
        (status = 409, description = "Already deposited or not in a depositable state"),
        (status = 502, description = "Document generation failed; nothing was persisted")
    )
)]
pub async fn commit_deposit(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
    Json(data): Json<CommitDeposit>,
) -> AppResult<Json<Intervention>> {
    let intervention = state.services.interventions.commit_deposit(id, &data).await?;
    Ok(Json(intervention))
}
