//! Clients repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::client::{Client, CreateClient, CreateDevice, Device, UpdateClient, UpdateDevice},
};

#[derive(Clone)]
pub struct ClientsRepository {
    pool: Pool<Postgres>,
}

impl ClientsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all clients
    pub async fn list(&self) -> AppResult<Vec<Client>> {
        let rows = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients ORDER BY last_name, first_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get client by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Client> {
        sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Client {} not found", id)))
    }

    /// Create client
    pub async fn create(&self, data: &CreateClient) -> AppResult<Client> {
        let row = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (first_name, last_name, phone, email, address, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(&data.address)
        .bind(&data.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update client
    pub async fn update(&self, id: i32, data: &UpdateClient) -> AppResult<Client> {
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

        add_field!(data.first_name, "first_name");
        add_field!(data.last_name, "last_name");
        add_field!(data.phone, "phone");
        add_field!(data.email, "email");
        add_field!(data.address, "address");
        add_field!(data.notes, "notes");

        let query = format!("UPDATE clients SET {} WHERE id = {} RETURNING *", sets.join(", "), id);

        let mut builder = sqlx::query_as::<_, Client>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.first_name);
        bind_field!(data.last_name);
        bind_field!(data.phone);
        bind_field!(data.email);
        bind_field!(data.address);
        bind_field!(data.notes);

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Client {} not found", id)))
    }

    /// Delete client and the devices it owns. Blocked while interventions
    /// or loans reference the client.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let referenced: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM interventions WHERE client_id = $1)
                OR EXISTS(SELECT 1 FROM loans WHERE client_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if referenced {
            return Err(AppError::Conflict(format!(
                "Client {} has interventions or loans and cannot be deleted",
                id
            )));
        }

        // Devices are values of the client and go with it
        sqlx::query("DELETE FROM devices WHERE client_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Client {} not found", id)));
        }

        tx.commit().await?;
        Ok(())
    }

    /// List a client's devices
    pub async fn list_devices(&self, client_id: i32) -> AppResult<Vec<Device>> {
        // Verify the client exists so an empty list is unambiguous
        self.get_by_id(client_id).await?;
        let rows = sqlx::query_as::<_, Device>(
            "SELECT * FROM devices WHERE client_id = $1 ORDER BY id",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get one of a client's devices
    pub async fn get_device(&self, client_id: i32, device_id: i32) -> AppResult<Device> {
        sqlx::query_as::<_, Device>(
            "SELECT * FROM devices WHERE id = $1 AND client_id = $2",
        )
        .bind(device_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Device {} not found for client {}", device_id, client_id))
        })
    }

    /// Add a device to a client
    pub async fn create_device(&self, client_id: i32, data: &CreateDevice) -> AppResult<Device> {
        self.get_by_id(client_id).await?;
        let row = sqlx::query_as::<_, Device>(
            r#"
            INSERT INTO devices (client_id, device_type, brand, model, serial_number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(&data.device_type)
        .bind(&data.brand)
        .bind(&data.model)
        .bind(&data.serial_number)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update a client's device
    pub async fn update_device(
        &self,
        client_id: i32,
        device_id: i32,
        data: &UpdateDevice,
    ) -> AppResult<Device> {
        let mut sets: Vec<String> = Vec::new();
        let mut idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.device_type, "device_type");
        add_field!(data.brand, "brand");
        add_field!(data.model, "model");
        add_field!(data.serial_number, "serial_number");

        if sets.is_empty() {
            return self.get_device(client_id, device_id).await;
        }

        let query = format!(
            "UPDATE devices SET {} WHERE id = {} AND client_id = {} RETURNING *",
            sets.join(", "),
            device_id,
            client_id
        );

        let mut builder = sqlx::query_as::<_, Device>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.device_type);
        bind_field!(data.brand);
        bind_field!(data.model);
        bind_field!(data.serial_number);

        builder
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Device {} not found for client {}", device_id, client_id))
            })
    }

    /// Remove a device from a client. Blocked while interventions reference it.
    pub async fn delete_device(&self, client_id: i32, device_id: i32) -> AppResult<()> {
        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM interventions WHERE device_id = $1)",
        )
        .bind(device_id)
        .fetch_one(&self.pool)
        .await?;

        if referenced {
            return Err(AppError::Conflict(format!(
                "Device {} is referenced by interventions and cannot be deleted",
                device_id
            )));
        }

        let result = sqlx::query("DELETE FROM devices WHERE id = $1 AND client_id = $2")
            .bind(device_id)
            .bind(client_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Device {} not found for client {}",
                device_id, client_id
            )));
        }
        Ok(())
    }
}
