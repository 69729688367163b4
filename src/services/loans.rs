//! Loan ledger service

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, Loan, LoanDetails, ReturnLoan},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list().await
    }

    /// Loan history for a loaner device
    pub async fn list_for_device(&self, loaner_device_id: i32) -> AppResult<Vec<LoanDetails>> {
        // Verify the device exists so an empty history is unambiguous
        self.repository.loaners.get_by_id(loaner_device_id).await?;
        self.repository.loans.list_for_device(loaner_device_id).await
    }

    /// Open a loan on an available loaner device
    pub async fn open(&self, data: &CreateLoan) -> AppResult<Loan> {
        self.repository.loans.open(data).await
    }

    /// Close a loan and release its device
    pub async fn close(&self, loan_id: i32, data: &ReturnLoan) -> AppResult<Loan> {
        self.repository.loans.close(loan_id, data).await
    }

    pub async fn count_open(&self) -> AppResult<i64> {
        self.repository.loans.count_open().await
    }

    pub async fn count_overdue(&self) -> AppResult<i64> {
        self.repository.loans.count_overdue().await
    }
}
