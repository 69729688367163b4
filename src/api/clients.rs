//! Client and client-device endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::client::{Client, CreateClient, CreateDevice, Device, UpdateClient, UpdateDevice},
};

use super::AuthenticatedTechnician;

/// List all clients
#[utoipa::path(
    get,
    path = "/clients",
    tag = "clients",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Client list", body = Vec<Client>)
    )
)]
pub async fn list_clients(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
) -> AppResult<Json<Vec<Client>>> {
    let clients = state.services.clients.list().await?;
    Ok(Json(clients))
}

/// Get client by ID
#[utoipa::path(
    get,
    path = "/clients/{id}",
    tag = "clients",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client details", body = Client),
        (status = 404, description = "Client not found")
    )
)]
pub async fn get_client(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
) -> AppResult<Json<Client>> {
    let client = state.services.clients.get_by_id(id).await?;
    Ok(Json(client))
}

/// Create a new client
#[utoipa::path(
    post,
    path = "/clients",
    tag = "clients",
    security(("bearer_auth" = [])),
    request_body = CreateClient,
    responses(
        (status = 201, description = "Client created", body = Client),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_client(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Json(data): Json<CreateClient>,
) -> AppResult<(StatusCode, Json<Client>)> {
    let client = state.services.clients.create(&data).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// Update a client
#[utoipa::path(
    put,
    path = "/clients/{id}",
    tag = "clients",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Client ID")),
    request_body = UpdateClient,
    responses(
        (status = 200, description = "Client updated", body = Client),
        (status = 404, description = "Client not found")
    )
)]
pub async fn update_client(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
    Json(data): Json<UpdateClient>,
) -> AppResult<Json<Client>> {
    let client = state.services.clients.update(id, &data).await?;
    Ok(Json(client))
}

/// Delete a client
#[utoipa::path(
    delete,
    path = "/clients/{id}",
    tag = "clients",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Client ID")),
    responses(
        (status = 204, description = "Client deleted"),
        (status = 404, description = "Client not found"),
        (status = 409, description = "Client has interventions")
    )
)]
pub async fn delete_client(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.clients.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List a client's devices
#[utoipa::path(
    get,
    path = "/clients/{id}/devices",
    tag = "clients",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Device list", body = Vec<Device>),
        (status = 404, description = "Client not found")
    )
)]
pub async fn list_devices(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Device>>> {
    let devices = state.services.clients.list_devices(id).await?;
    Ok(Json(devices))
}

/// Add a device to a client
#[utoipa::path(
    post,
    path = "/clients/{id}/devices",
    tag = "clients",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Client ID")),
    request_body = CreateDevice,
    responses(
        (status = 201, description = "Device created", body = Device),
        (status = 404, description = "Client not found")
    )
)]
pub async fn create_device(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path(id): Path<i32>,
    Json(data): Json<CreateDevice>,
) -> AppResult<(StatusCode, Json<Device>)> {
    let device = state.services.clients.create_device(id, &data).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

/// Update a client's device
#[utoipa::path(
    put,
    path = "/clients/{id}/devices/{device_id}",
    tag = "clients",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Client ID"),
        ("device_id" = i32, Path, description = "Device ID")
    ),
    request_body = UpdateDevice,
    responses(
        (status = 200, description = "Device updated", body = Device),
        (status = 404, description = "Device not found")
    )
)]
pub async fn update_device(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path((id, device_id)): Path<(i32, i32)>,
    Json(data): Json<UpdateDevice>,
) -> AppResult<Json<Device>> {
    let device = state.services.clients.update_device(id, device_id, &data).await?;
    Ok(Json(device))
}

/// Remove a device from a client
#[utoipa::path(
    delete,
    path = "/clients/{id}/devices/{device_id}",
    tag = "clients",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Client ID"),
        ("device_id" = i32, Path, description = "Device ID")
    ),
    responses(
        (status = 204, description = "Device deleted"),
        (status = 404, description = "Device not found"),
        (status = 409, description = "Device is referenced by interventions")
    )
)]
pub async fn delete_device(
    State(state): State<crate::AppState>,
    AuthenticatedTechnician(_claims): AuthenticatedTechnician,
    Path((id, device_id)): Path<(i32, i32)>,
) -> AppResult<StatusCode> {
    state.services.clients.delete_device(id, device_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
