//! Loaner device pool service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::loaner::{CreateLoanerDevice, LoanerDevice, UpdateLoanerDevice},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoanersService {
    repository: Repository,
}

impl LoanersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<LoanerDevice>> {
        self.repository.loaners.list().await
    }

    pub async fn list_available(&self) -> AppResult<Vec<LoanerDevice>> {
        self.repository.loaners.list_available().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<LoanerDevice> {
        self.repository.loaners.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateLoanerDevice) -> AppResult<LoanerDevice> {
        data.validate().map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.loaners.create(data).await
    }

    pub async fn update(&self, id: i32, data: &UpdateLoanerDevice) -> AppResult<LoanerDevice> {
        self.repository.loaners.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.loaners.delete(id).await
    }
}
