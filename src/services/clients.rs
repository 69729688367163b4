//! Client management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::client::{Client, CreateClient, CreateDevice, Device, UpdateClient, UpdateDevice},
    repository::Repository,
};

#[derive(Clone)]
pub struct ClientsService {
    repository: Repository,
}

impl ClientsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Client>> {
        self.repository.clients.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Client> {
        self.repository.clients.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateClient) -> AppResult<Client> {
        data.validate().map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.clients.create(data).await
    }

    pub async fn update(&self, id: i32, data: &UpdateClient) -> AppResult<Client> {
        data.validate().map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.clients.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.clients.delete(id).await
    }

    pub async fn list_devices(&self, client_id: i32) -> AppResult<Vec<Device>> {
        self.repository.clients.list_devices(client_id).await
    }

    pub async fn create_device(&self, client_id: i32, data: &CreateDevice) -> AppResult<Device> {
        data.validate().map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.clients.create_device(client_id, data).await
    }

    pub async fn update_device(
        &self,
        client_id: i32,
        device_id: i32,
        data: &UpdateDevice,
    ) -> AppResult<Device> {
        self.repository.clients.update_device(client_id, device_id, data).await
    }

    pub async fn delete_device(&self, client_id: i32, device_id: i32) -> AppResult<()> {
        self.repository.clients.delete_device(client_id, device_id).await
    }
}
