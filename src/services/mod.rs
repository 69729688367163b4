//! Business logic services

pub mod clients;
pub mod documents;
pub mod interventions;
pub mod loaners;
pub mod loans;
pub mod parts;

use std::sync::Arc;

use crate::{config::DocumentsConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub clients: clients::ClientsService,
    pub interventions: interventions::InterventionsService,
    pub loaners: loaners::LoanersService,
    pub loans: loans::LoansService,
    pub parts: parts::PartsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, documents_config: &DocumentsConfig) -> AppResult<Self> {
        let documents: Arc<dyn documents::DocumentGenerator> =
            Arc::new(documents::HttpDocumentGenerator::new(documents_config)?);
        Ok(Self {
            clients: clients::ClientsService::new(repository.clone()),
            interventions: interventions::InterventionsService::new(repository.clone(), documents),
            loaners: loaners::LoanersService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone()),
            parts: parts::PartsService::new(repository.clone()),
            repository,
        })
    }

    /// Probe the database connection (readiness checks)
    pub async fn ping_database(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.repository.pool).await?;
        Ok(())
    }
}
