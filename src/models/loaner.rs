//! Loaner device (fleet) model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::LoanerDeviceStatus;

/// Shop-owned appliance that can be lent to a client during a repair
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanerDevice {
    pub id: i32,
    pub name: String,
    pub device_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub status: LoanerDeviceStatus,
    /// Free-text condition, updated on each loan return
    pub condition: Option<String>,
    /// Replacement value, used for the loan agreement document
    pub value: Option<Decimal>,
    pub accessories: Vec<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Raw database row, status as stored code
#[derive(Debug, Clone, FromRow)]
pub struct LoanerDeviceRow {
    pub id: i32,
    pub name: String,
    pub device_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub status: i16,
    pub condition: Option<String>,
    pub value: Option<Decimal>,
    pub accessories: sqlx::types::Json<Vec<String>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<LoanerDeviceRow> for LoanerDevice {
    fn from(row: LoanerDeviceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            device_type: row.device_type,
            brand: row.brand,
            model: row.model,
            serial_number: row.serial_number,
            status: LoanerDeviceStatus::from(row.status),
            condition: row.condition,
            value: row.value,
            accessories: row.accessories.0,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Create loaner device request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLoanerDevice {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "device_type is required"))]
    pub device_type: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub condition: Option<String>,
    pub value: Option<Decimal>,
    pub accessories: Option<Vec<String>>,
    pub notes: Option<String>,
}

/// Update loaner device request.
///
/// `status` only accepts the operator-settable values: `Disponible` and
/// `En maintenance`. `Prêté` is owned by the loan ledger.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLoanerDevice {
    pub name: Option<String>,
    pub device_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub status: Option<LoanerDeviceStatus>,
    pub condition: Option<String>,
    pub value: Option<Decimal>,
    pub accessories: Option<Vec<String>>,
    pub notes: Option<String>,
}
