//! Spare-parts stock endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::part::{CreatePart, Part, StockAlerts, UpdatePart},
};

use super::AuthenticatedTechnician;

/// List all parts
#[utoipa::path(
    get,
    path = "/parts",
    tag = "parts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Part list", body = Vec<Part>)
    )
)]
pub async fn list_parts(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
) -> AppResult<Json<Vec<Part>>> {
    let parts = state.services.parts.list().await?;
    Ok(Json(parts))
}

/// Parts currently under their minimum stock
#[utoipa::path(
    get,
    path = "/parts/alerts",
    tag = "parts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Stock alerts", body = StockAlerts)
    )
)]
pub async fn list_alerts(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
) -> AppResult<Json<StockAlerts>> {
    let alerts = state.services.parts.alerts().await?;
    Ok(Json(alerts))
}

/// Get part by ID
#[utoipa::path(
    get,
    path = "/parts/{id}",
    tag = "parts",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Part ID")),
    responses(
        (status = 200, description = "Part details", body = Part),
        (status = 404, description = "Part not found")
    )
)]
pub async fn get_part(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
) -> AppResult<Json<Part>> {
    let part = state.services.parts.get_by_id(id).await?;
    Ok(Json(part))
}

/// Create a part
#[utoipa::path(
    post,
    path = "/parts",
    tag = "parts",
    security(("bearer_auth" = [])),
    request_body = CreatePart,
    responses(
        (status = 201, description = "Part created", body = Part),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Reference already exists")
    )
)]
pub async fn create_part(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Json(data): Json<CreatePart>,
) -> AppResult<(StatusCode, Json<Part>)> {
    let part = state.services.parts.create(&data).await?;
    Ok((StatusCode::CREATED, Json(part)))
}

/// Update a part (absolute stock set is administrative)
#[utoipa::path(
    put,
    path = "/parts/{id}",
    tag = "parts",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Part ID")),
    request_body = UpdatePart,
    responses(
        (status = 200, description = "Part updated", body = Part),
        (status = 404, description = "Part not found"),
        (status = 409, description = "Reference already exists")
    )
)]
pub async fn update_part(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
    Json(data): Json<UpdatePart>,
) -> AppResult<Json<Part>> {
    let part = state.services.parts.update(id, &data).await?;
    Ok(Json(part))
}

/// Delete a part
#[utoipa::path(
    delete,
    path = "/parts/{id}",
    tag = "parts",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Part ID")),
    responses(
        (status = 204, description = "Part deleted"),
        (status = 404, description = "Part not found"),
        (status = 409, description = "Part is used by interventions")
    )
)]
pub async fn delete_part(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.parts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
