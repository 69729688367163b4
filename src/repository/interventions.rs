//! Interventions repository for database operations.
//!
//! Holds the workflow's consistency rules: device references must resolve
//! inside the owning client, part usage decrements stock conditionally in
//! the same transaction that records the usage line, and the workshop
//! deposit commit is a single conditional UPDATE so a failed commit leaves
//! no partial state behind.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{InterventionStatus, InterventionType, LoanerDeviceStatus},
        intervention::{
            CreateIntervention, DeviceRef, Intervention, InterventionQuery, InterventionRow,
            PartUsage, UpdateIntervention,
        },
    },
};

#[derive(Clone)]
pub struct InterventionsRepository {
    pool: Pool<Postgres>,
}

impl InterventionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get intervention by ID, with its part usage lines
    pub async fn get_by_id(&self, id: i32) -> AppResult<Intervention> {
        let row = sqlx::query_as::<_, InterventionRow>("SELECT * FROM interventions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Intervention {} not found", id)))?;

        let parts = self.list_part_usages(id).await?;
        Ok(row.into_intervention(parts))
    }

    /// List interventions, filtered by status/client, paginated
    pub async fn list(&self, query: &InterventionQuery) -> AppResult<(Vec<Intervention>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut conditions: Vec<String> = Vec::new();
        if let Some(status) = query.status {
            conditions.push(format!("status = {}", i16::from(status)));
        }
        if let Some(client_id) = query.client_id {
            conditions.push(format!("client_id = {}", client_id));
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM interventions {}", where_clause))
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, InterventionRow>(&format!(
            "SELECT * FROM interventions {} ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            where_clause
        ))
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut all_usages = self.list_part_usages_for(&ids).await?;

        let interventions = rows
            .into_iter()
            .map(|row| {
                let parts = all_usages.remove(&row.id).unwrap_or_default();
                row.into_intervention(parts)
            })
            .collect();

        Ok((interventions, total))
    }

    /// Create intervention in status Demande.
    ///
    /// A registered device must belong to the given client; naming a loaner
    /// device requires it to be Disponible, but does not open a loan.
    pub async fn create(&self, data: &CreateIntervention) -> AppResult<Intervention> {
        let client_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
                .bind(data.client_id)
                .fetch_one(&self.pool)
                .await?;
        if !client_exists {
            return Err(AppError::NotFound(format!("Client {} not found", data.client_id)));
        }

        let (device_id, adhoc) = match &data.device {
            DeviceRef::Registered { device_id } => {
                let owned: bool = sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM devices WHERE id = $1 AND client_id = $2)",
                )
                .bind(device_id)
                .bind(data.client_id)
                .fetch_one(&self.pool)
                .await?;
                if !owned {
                    return Err(AppError::NotFound(format!(
                        "Device {} not found for client {}",
                        device_id, data.client_id
                    )));
                }
                (Some(*device_id), None)
            }
            DeviceRef::AdHoc {
                device_type,
                brand,
                model,
                serial_number,
            } => {
                if device_type.trim().is_empty() {
                    return Err(AppError::Validation(
                        "Ad-hoc device requires a device_type".to_string(),
                    ));
                }
                (
                    None,
                    Some((device_type.clone(), brand.clone(), model.clone(), serial_number.clone())),
                )
            }
        };

        if let Some(loaner_id) = data.loaner_device_id {
            let status: Option<i16> =
                sqlx::query_scalar("SELECT status FROM loaner_devices WHERE id = $1")
                    .bind(loaner_id)
                    .fetch_optional(&self.pool)
                    .await?;
            match status {
                None => {
                    return Err(AppError::NotFound(format!(
                        "Loaner device {} not found",
                        loaner_id
                    )));
                }
                Some(code) if LoanerDeviceStatus::from(code) != LoanerDeviceStatus::Disponible => {
                    return Err(AppError::DeviceUnavailable(format!(
                        "Loaner device {} is not available",
                        loaner_id
                    )));
                }
                Some(_) => {}
            }
        }

        let (adhoc_type, adhoc_brand, adhoc_model, adhoc_serial) = match adhoc {
            Some((t, b, m, s)) => (Some(t), b, m, s),
            None => (None, None, None, None),
        };

        let row = sqlx::query_as::<_, InterventionRow>(
            r#"
            INSERT INTO interventions
                (reference, client_id, device_id,
                 adhoc_device_type, adhoc_brand, adhoc_model, adhoc_serial_number,
                 loaner_device_id, status, intervention_type, technician, description, planned_date)
            VALUES ('INT-' || lpad(nextval('interventions_reference_seq')::text, 6, '0'),
                    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(data.client_id)
        .bind(device_id)
        .bind(adhoc_type)
        .bind(adhoc_brand)
        .bind(adhoc_model)
        .bind(adhoc_serial)
        .bind(data.loaner_device_id)
        .bind(i16::from(InterventionStatus::Demande))
        .bind(i16::from(data.intervention_type.unwrap_or(InterventionType::Atelier)))
        .bind(&data.technician)
        .bind(&data.description)
        .bind(data.planned_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_intervention(Vec::new()))
    }

    /// Partial update. Moving into a completed status stamps the completion
    /// date if it is not set yet; the total cost is never stored, so labor
    /// changes simply flow into the next read.
    pub async fn update(&self, id: i32, data: &UpdateIntervention) -> AppResult<Intervention> {
        let status_code = data.status.map(i16::from);
        let type_code = data.intervention_type.map(i16::from);
        let completed_stamp: Option<DateTime<Utc>> = match data.status {
            Some(s) if s.is_completed() => Some(Utc::now()),
            _ => None,
        };

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

        add_field!(status_code, "status");
        add_field!(type_code, "intervention_type");
        add_field!(data.technician, "technician");
        add_field!(data.description, "description");
        add_field!(data.diagnosis, "diagnosis");
        add_field!(data.notes, "notes");
        add_field!(data.planned_date, "planned_date");
        add_field!(data.labor_hours, "labor_hours");
        add_field!(data.hourly_rate, "hourly_rate");
        if completed_stamp.is_some() {
            sets.push(format!("completed_date = COALESCE(completed_date, ${})", idx));
        }

        let query = format!(
            "UPDATE interventions SET {} WHERE id = {} RETURNING *",
            sets.join(", "),
            id
        );

        let mut builder = sqlx::query_as::<_, InterventionRow>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(status_code);
        bind_field!(type_code);
        bind_field!(data.technician);
        bind_field!(data.description);
        bind_field!(data.diagnosis);
        bind_field!(data.notes);
        bind_field!(data.planned_date);
        bind_field!(data.labor_hours);
        bind_field!(data.hourly_rate);
        bind_field!(completed_stamp);

        let row = builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Intervention {} not found", id)))?;

        let parts = self.list_part_usages(id).await?;
        Ok(row.into_intervention(parts))
    }

    /// Delete intervention. Blocked while an open loan references it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let on_loan: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE intervention_id = $1 AND returned_date IS NULL)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if on_loan {
            return Err(AppError::Conflict(format!(
                "Intervention {} is referenced by an open loan and cannot be deleted",
                id
            )));
        }

        // Returned loans keep their history but drop the soft reference
        sqlx::query("UPDATE loans SET intervention_id = NULL WHERE intervention_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM intervention_parts WHERE intervention_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM interventions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Intervention {} not found", id)));
        }
        tx.commit().await?;
        Ok(())
    }

    /// Record a part usage: decrement stock and append the usage line as one
    /// transaction. The decrement is conditional on sufficient stock, so the
    /// quantity can never go negative whatever the interleaving.
    pub async fn record_part_usage(
        &self,
        intervention_id: i32,
        part_id: i32,
        quantity: i32,
    ) -> AppResult<PartUsage> {
        if quantity <= 0 {
            return Err(AppError::Validation("quantity must be at least 1".to_string()));
        }

        let mut tx = self.pool.begin().await?;

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

        let decremented = sqlx::query(
            r#"
            UPDATE parts SET stock_quantity = stock_quantity - $1
            WHERE id = $2 AND stock_quantity >= $1
            RETURNING reference, designation, sale_price
            "#,
        )
        .bind(quantity)
        .bind(part_id)
        .fetch_optional(&mut *tx)
        .await?;

        let part_row = match decremented {
            Some(row) => row,
            None => {
                let stock: Option<i32> =
                    sqlx::query_scalar("SELECT stock_quantity FROM parts WHERE id = $1")
                        .bind(part_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                return match stock {
                    Some(stock) => Err(AppError::InsufficientStock(format!(
                        "Part {} has {} in stock, {} requested",
                        part_id, stock, quantity
                    ))),
                    None => Err(AppError::NotFound(format!("Part {} not found", part_id))),
                };
            }
        };

        let usage = sqlx::query_as::<_, PartUsage>(
            r#"
            WITH inserted AS (
                INSERT INTO intervention_parts (intervention_id, part_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT inserted.id, inserted.intervention_id, inserted.part_id,
                   $5::text AS part_reference, $6::text AS part_designation,
                   inserted.quantity, inserted.unit_price
            FROM inserted
            "#,
        )
        .bind(intervention_id)
        .bind(part_id)
        .bind(quantity)
        .bind(part_row.get::<rust_decimal::Decimal, _>("sale_price"))
        .bind(part_row.get::<String, _>("reference"))
        .bind(part_row.get::<String, _>("designation"))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(usage)
    }

    /// Persist the workshop deposit in a single conditional UPDATE: either
    /// every artifact lands together with the deposit timestamp, or nothing
    /// does.
    pub async fn commit_deposit(
        &self,
        id: i32,
        photos: &[String],
        accessories: &[String],
        document_url: &str,
        qr_url: &str,
    ) -> AppResult<Intervention> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, InterventionRow>(
            r#"
            UPDATE interventions
            SET deposit_date = $1, deposit_photos = $2, deposit_accessories = $3,
                deposit_document_url = $4, deposit_qr_url = $5, updated_at = $1
            WHERE id = $6 AND deposit_date IS NULL AND status = $7 AND intervention_type = $8
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(sqlx::types::Json(photos.to_vec()))
        .bind(sqlx::types::Json(accessories.to_vec()))
        .bind(document_url)
        .bind(qr_url)
        .bind(id)
        .bind(i16::from(InterventionStatus::Planifie))
        .bind(i16::from(InterventionType::Atelier))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let parts = self.list_part_usages(id).await?;
                Ok(row.into_intervention(parts))
            }
            // Zero rows: re-read to report why the guard did not pass
            None => Err(self.deposit_rejection(id).await?),
        }
    }

    async fn deposit_rejection(&self, id: i32) -> AppResult<AppError> {
        let row = sqlx::query("SELECT status, intervention_type, deposit_date FROM interventions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(AppError::NotFound(format!("Intervention {} not found", id)));
        };
        if row.get::<Option<DateTime<Utc>>, _>("deposit_date").is_some() {
            return Ok(AppError::AlreadyDeposited(format!(
                "Intervention {} has already been deposited",
                id
            )));
        }
        if InterventionType::from(row.get::<i16, _>("intervention_type")) != InterventionType::Atelier {
            return Ok(AppError::Conflict(format!(
                "Intervention {} is not a workshop intervention",
                id
            )));
        }
        Ok(AppError::Conflict(format!(
            "Intervention {} must be in status '{}' to record a deposit",
            id,
            InterventionStatus::Planifie
        )))
    }

    async fn list_part_usages(&self, intervention_id: i32) -> AppResult<Vec<PartUsage>> {
        let rows = sqlx::query_as::<_, PartUsage>(
            r#"
            SELECT ip.id, ip.intervention_id, ip.part_id,
                   p.reference AS part_reference, p.designation AS part_designation,
                   ip.quantity, ip.unit_price
            FROM intervention_parts ip
            JOIN parts p ON ip.part_id = p.id
            WHERE ip.intervention_id = $1
            ORDER BY ip.id
            "#,
        )
        .bind(intervention_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_part_usages_for(
        &self,
        intervention_ids: &[i32],
    ) -> AppResult<std::collections::HashMap<i32, Vec<PartUsage>>> {
        let mut grouped: std::collections::HashMap<i32, Vec<PartUsage>> =
            std::collections::HashMap::new();
        if intervention_ids.is_empty() {
            return Ok(grouped);
        }
        let rows = sqlx::query_as::<_, PartUsage>(
            r#"
            SELECT ip.id, ip.intervention_id, ip.part_id,
                   p.reference AS part_reference, p.designation AS part_designation,
                   ip.quantity, ip.unit_price
            FROM intervention_parts ip
            JOIN parts p ON ip.part_id = p.id
            WHERE ip.intervention_id = ANY($1)
            ORDER BY ip.id
            "#,
        )
        .bind(intervention_ids)
        .fetch_all(&self.pool)
        .await?;
        for usage in rows {
            grouped.entry(usage.intervention_id).or_default().push(usage);
        }
        Ok(grouped)
    }
}
