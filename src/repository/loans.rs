//! Loan ledger repository.
//!
//! A loaner device has at most one open loan at any instant. Opening a loan
//! claims the device with a single conditional UPDATE so two concurrent
//! opens against the same device cannot both succeed; a partial unique index
//! on open loans backs the same invariant at the storage layer.

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::LoanerDeviceStatus,
        loan::{CreateLoan, Loan, LoanDetails, ReturnLoan},
    },
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", id)))
    }

    /// List all loans, most recent first
    pub async fn list(&self) -> AppResult<Vec<LoanDetails>> {
        self.query_details("ORDER BY l.loan_date DESC", None).await
    }

    /// Loan history for one loaner device
    pub async fn list_for_device(&self, loaner_device_id: i32) -> AppResult<Vec<LoanDetails>> {
        self.query_details(
            "WHERE l.loaner_device_id = $1 ORDER BY l.loan_date DESC",
            Some(loaner_device_id),
        )
        .await
    }

    async fn query_details(&self, tail: &str, bind_id: Option<i32>) -> AppResult<Vec<LoanDetails>> {
        let sql = format!(
            r#"
            SELECT l.*, d.name AS loaner_device_name,
                   c.first_name || ' ' || c.last_name AS client_name
            FROM loans l
            JOIN loaner_devices d ON l.loaner_device_id = d.id
            JOIN clients c ON l.client_id = c.id
            {}
            "#,
            tail
        );

        let mut query = sqlx::query(&sql);
        if let Some(id) = bind_id {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let now = Utc::now();
        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let loan = Loan {
                id: row.get("id"),
                loaner_device_id: row.get("loaner_device_id"),
                client_id: row.get("client_id"),
                intervention_id: row.get("intervention_id"),
                loan_date: row.get("loan_date"),
                expected_return_date: row.get("expected_return_date"),
                returned_date: row.get("returned_date"),
                condition_at_loan: row.get("condition_at_loan"),
                condition_at_return: row.get("condition_at_return"),
                notes: row.get("notes"),
                created_at: row.get("created_at"),
            };
            let status = loan.status_at(now);
            result.push(LoanDetails {
                id: loan.id,
                loaner_device_id: loan.loaner_device_id,
                loaner_device_name: row.get("loaner_device_name"),
                client_id: loan.client_id,
                client_name: row.get("client_name"),
                intervention_id: loan.intervention_id,
                loan_date: loan.loan_date,
                expected_return_date: loan.expected_return_date,
                returned_date: loan.returned_date,
                condition_at_loan: loan.condition_at_loan,
                condition_at_return: loan.condition_at_return,
                notes: loan.notes,
                status,
            });
        }
        Ok(result)
    }

    /// Open a loan: claim the device and insert the loan row as one unit.
    pub async fn open(&self, data: &CreateLoan) -> AppResult<Loan> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Verify the client resolves
        let client_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                .bind(data.client_id)
                .fetch_one(&mut *tx)
                .await?;
        if !client_exists {
            return Err(AppError::NotFound(format!("Client {} not found", data.client_id)));
        }

        if let Some(intervention_id) = data.intervention_id {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM interventions WHERE id = $1)")
                    .bind(intervention_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !exists {
                return Err(AppError::NotFound(format!(
                    "Intervention {} not found",
                    intervention_id
                )));
            }
        }

        // Claim the device: succeeds only while it is Disponible, so two
        // concurrent opens cannot both pass this point.
        let claimed = sqlx::query(
            "UPDATE loaner_devices SET status = $1 WHERE id = $2 AND status = $3 RETURNING condition",
        )
        .bind(i16::from(LoanerDeviceStatus::Prete))
        .bind(data.loaner_device_id)
        .bind(i16::from(LoanerDeviceStatus::Disponible))
        .fetch_optional(&mut *tx)
        .await?;

        let device_condition: Option<String> = match claimed {
            Some(row) => row.get("condition"),
            None => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM loaner_devices WHERE id = $1)")
                        .bind(data.loaner_device_id)
                        .fetch_one(&mut *tx)
                        .await?;
                if exists {
                    return Err(AppError::DeviceUnavailable(format!(
                        "Loaner device {} is not available",
                        data.loaner_device_id
                    )));
                }
                return Err(AppError::NotFound(format!(
                    "Loaner device {} not found",
                    data.loaner_device_id
                )));
            }
        };

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (loaner_device_id, client_id, intervention_id, loan_date,
                               expected_return_date, condition_at_loan, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(data.loaner_device_id)
        .bind(data.client_id)
        .bind(data.intervention_id)
        .bind(now)
        .bind(data.expected_return_date)
        .bind(data.condition_at_loan.as_deref().or(device_condition.as_deref()))
        .bind(&data.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Close a loan: stamp the return and release the device as one unit.
    pub async fn close(&self, loan_id: i32, data: &ReturnLoan) -> AppResult<Loan> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(loan_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", loan_id)))?;

        if loan.returned_date.is_some() {
            return Err(AppError::AlreadyReturned(format!(
                "Loan {} was already returned",
                loan_id
            )));
        }

        let closed = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET returned_date = $1, condition_at_return = $2,
                notes = COALESCE($3, notes)
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(&data.condition_at_return)
        .bind(&data.notes)
        .bind(loan_id)
        .fetch_one(&mut *tx)
        .await?;

        // Release the device and record the condition it came back in
        sqlx::query(
            "UPDATE loaner_devices SET status = $1, condition = COALESCE($2, condition) WHERE id = $3",
        )
        .bind(i16::from(LoanerDeviceStatus::Disponible))
        .bind(&data.condition_at_return)
        .bind(loan.loaner_device_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(closed)
    }

    /// Count open loans
    pub async fn count_open(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE returned_date IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count open loans past their expected return date
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE returned_date IS NULL AND expected_return_date < NOW()",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
