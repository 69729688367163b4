//! Spare-parts repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::part::{CreatePart, Part, UpdatePart},
};

#[derive(Clone)]
pub struct PartsRepository {
    pool: Pool<Postgres>,
}

impl PartsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all parts
    pub async fn list(&self) -> AppResult<Vec<Part>> {
        let rows = sqlx::query_as::<_, Part>("SELECT * FROM parts ORDER BY reference")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get part by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Part> {
        sqlx::query_as::<_, Part>("SELECT * FROM parts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Part {} not found", id)))
    }

    /// Create part. The reference is unique across the stock.
    pub async fn create(&self, data: &CreatePart) -> AppResult<Part> {
        let result = sqlx::query_as::<_, Part>(
            r#"
            INSERT INTO parts (reference, designation, brand, compatible_models,
                               stock_quantity, min_quantity, purchase_price, sale_price, supplier)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&data.reference)
        .bind(&data.designation)
        .bind(&data.brand)
        .bind(&data.compatible_models)
        .bind(data.stock_quantity.unwrap_or(0))
        .bind(data.min_quantity.unwrap_or(0))
        .bind(data.purchase_price)
        .bind(data.sale_price)
        .bind(&data.supplier)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(part) => Ok(part),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
                format!("Part reference '{}' already exists", data.reference),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Update part. Absolute stock set via this path is administrative.
    pub async fn update(&self, id: i32, data: &UpdatePart) -> AppResult<Part> {
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

        add_field!(data.reference, "reference");
        add_field!(data.designation, "designation");
        add_field!(data.brand, "brand");
        add_field!(data.compatible_models, "compatible_models");
        add_field!(data.stock_quantity, "stock_quantity");
        add_field!(data.min_quantity, "min_quantity");
        add_field!(data.purchase_price, "purchase_price");
        add_field!(data.sale_price, "sale_price");
        add_field!(data.supplier, "supplier");
        add_field!(data.active, "active");

        let query = format!("UPDATE parts SET {} WHERE id = {} RETURNING *", sets.join(", "), id);

        let mut builder = sqlx::query_as::<_, Part>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.reference);
        bind_field!(data.designation);
        bind_field!(data.brand);
        bind_field!(data.compatible_models);
        bind_field!(data.stock_quantity);
        bind_field!(data.min_quantity);
        bind_field!(data.purchase_price);
        bind_field!(data.sale_price);
        bind_field!(data.supplier);
        bind_field!(data.active);

        let result = builder.fetch_optional(&self.pool).await;

        match result {
            Ok(Some(part)) => Ok(part),
            Ok(None) => Err(AppError::NotFound(format!("Part {} not found", id))),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::Conflict("Part reference already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete part. Blocked while intervention usage lines reference it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM intervention_parts WHERE part_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if referenced {
            return Err(AppError::Conflict(format!(
                "Part {} is used by interventions and cannot be deleted",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM parts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Part {} not found", id)));
        }
        Ok(())
    }

    /// Active parts currently under their minimum stock
    pub async fn list_alerts(&self) -> AppResult<Vec<Part>> {
        let rows = sqlx::query_as::<_, Part>(
            r#"
            SELECT * FROM parts
            WHERE active = TRUE AND stock_quantity < min_quantity
            ORDER BY reference
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Count of active parts currently under their minimum stock
    pub async fn count_alerts(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM parts WHERE active = TRUE AND stock_quantity < min_quantity",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
