//! Repository layer for database operations

pub mod clients;
pub mod interventions;
pub mod loaners;
pub mod loans;
pub mod parts;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub clients: clients::ClientsRepository,
    pub interventions: interventions::InterventionsRepository,
    pub loaners: loaners::LoanersRepository,
    pub loans: loans::LoansRepository,
    pub parts: parts::PartsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            clients: clients::ClientsRepository::new(pool.clone()),
            interventions: interventions::InterventionsRepository::new(pool.clone()),
            loaners: loaners::LoanersRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            parts: parts::PartsRepository::new(pool.clone()),
            pool,
        }
    }
}
