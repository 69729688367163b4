//! Loaner device pool repository

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::LoanerDeviceStatus,
        loaner::{CreateLoanerDevice, LoanerDevice, LoanerDeviceRow, UpdateLoanerDevice},
    },
};

#[derive(Clone)]
pub struct LoanersRepository {
    pool: Pool<Postgres>,
}

impl LoanersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List the whole fleet
    pub async fn list(&self) -> AppResult<Vec<LoanerDevice>> {
        let rows = sqlx::query_as::<_, LoanerDeviceRow>(
            "SELECT * FROM loaner_devices ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(LoanerDevice::from).collect())
    }

    /// List devices currently available for lending
    pub async fn list_available(&self) -> AppResult<Vec<LoanerDevice>> {
        let rows = sqlx::query_as::<_, LoanerDeviceRow>(
            "SELECT * FROM loaner_devices WHERE status = $1 ORDER BY name",
        )
        .bind(i16::from(LoanerDeviceStatus::Disponible))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(LoanerDevice::from).collect())
    }

    /// Get loaner device by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<LoanerDevice> {
        let row = sqlx::query_as::<_, LoanerDeviceRow>(
            "SELECT * FROM loaner_devices WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loaner device {} not found", id)))?;
        Ok(row.into())
    }

    /// Create loaner device, available by default
    pub async fn create(&self, data: &CreateLoanerDevice) -> AppResult<LoanerDevice> {
        let accessories = sqlx::types::Json(data.accessories.clone().unwrap_or_default());
        let row = sqlx::query_as::<_, LoanerDeviceRow>(
            r#"
            INSERT INTO loaner_devices
                (name, device_type, brand, model, serial_number, status, condition, value, accessories, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.device_type)
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.serial_number)
        .bind(i16::from(LoanerDeviceStatus::Disponible))
        .bind(&data.condition)
        .bind(data.value)
        .bind(accessories)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    /// Update loaner device.
    ///
    /// Manual status edits may only toggle Disponible ⇔ En maintenance, and
    /// never while an open loan holds the device (its status then belongs to
    /// the loan ledger).
    pub async fn update(&self, id: i32, data: &UpdateLoanerDevice) -> AppResult<LoanerDevice> {
        let status_code = match data.status {
            Some(LoanerDeviceStatus::Prete) => {
                return Err(AppError::Validation(
                    "Status 'Prêté' is set by opening a loan, not manually".to_string(),
                ));
            }
            Some(status) => {
                let on_loan: bool = sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM loans WHERE loaner_device_id = $1 AND returned_date IS NULL)",
                )
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
                if on_loan {
                    return Err(AppError::Conflict(format!(
                        "Loaner device {} has an open loan; return it before changing its status",
                        id
                    )));
                }
                Some(i16::from(status))
            }
            None => None,
        };
        let accessories = data.accessories.as_ref().map(|a| sqlx::types::Json(a.clone()));

        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.device_type, "device_type");
        add_field!(data.brand, "brand");
        add_field!(data.model, "model");
        add_field!(data.serial_number, "serial_number");
        add_field!(status_code, "status");
        add_field!(data.condition, "condition");
        add_field!(data.value, "value");
        add_field!(accessories, "accessories");
        add_field!(data.notes, "notes");

        let query = format!(
            "UPDATE loaner_devices SET {} WHERE id = {} RETURNING *",
            sets.join(", "),
            id
        );

        let mut builder = sqlx::query_as::<_, LoanerDeviceRow>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.device_type);
        bind_field!(data.brand);
        bind_field!(data.model);
        bind_field!(data.serial_number);
        bind_field!(status_code);
        bind_field!(data.condition);
        bind_field!(data.value);
        bind_field!(accessories);
        bind_field!(data.notes);

        let row = builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loaner device {} not found", id)))?;
        Ok(row.into())
    }

    /// Delete loaner device. Blocked while an open loan references it; the
    /// returned-loan history of the device is removed with it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let on_loan: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE loaner_device_id = $1 AND returned_date IS NULL)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if on_loan {
            return Err(AppError::Conflict(format!(
                "Loaner device {} has an open loan and cannot be deleted",
                id
            )));
        }

        sqlx::query("DELETE FROM loans WHERE loaner_device_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM loaner_devices WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Loaner device {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }
}
