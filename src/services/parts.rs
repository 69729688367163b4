//! Spare-parts stock service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::part::{CreatePart, Part, StockAlerts, UpdatePart},
    repository::Repository,
};

#[derive(Clone)]
pub struct PartsService {
    repository: Repository,
}

impl PartsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Part>> {
        self.repository.parts.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Part> {
        self.repository.parts.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreatePart) -> AppResult<Part> {
        data.validate().map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.parts.create(data).await
    }

    pub async fn update(&self, id: i32, data: &UpdatePart) -> AppResult<Part> {
        data.validate().map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.parts.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.parts.delete(id).await
    }

    /// Parts currently under their minimum stock, with the count
    pub async fn alerts(&self) -> AppResult<StockAlerts> {
        let parts = self.repository.parts.list_alerts().await?;
        let count = parts.len() as i64;
        Ok(StockAlerts { count, parts })
    }
}
