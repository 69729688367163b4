//! Intervention (repair work order) model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{InterventionStatus, InterventionType};

/// Fixed catalog of accessories recordable at workshop deposit time
pub const ACCESSORY_CATALOG: &[&str] = &[
    "Câble d'alimentation",
    "Télécommande",
    "Notice",
    "Panier",
    "Grille",
    "Plaque",
    "Tuyau d'évacuation",
    "Tuyau d'arrivée d'eau",
    "Bac à produit",
    "Filtre",
    "Accessoire divers",
];

/// The appliance an intervention concerns: either a device registered on the
/// client, or an ad-hoc snapshot taken at intake when the device is not in
/// the registry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceRef {
    Registered {
        device_id: i32,
    },
    AdHoc {
        device_type: String,
        brand: Option<String>,
        model: Option<String>,
        serial_number: Option<String>,
    },
}

/// A spare part consumed by an intervention; unit price is captured at the
/// time of use and does not follow later part-price edits.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PartUsage {
    pub id: i32,
    pub intervention_id: i32,
    pub part_id: i32,
    pub part_reference: String,
    pub part_designation: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Workshop deposit artifacts, present once the deposit has been committed
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkshopDeposit {
    pub deposit_date: DateTime<Utc>,
    pub photos: Vec<String>,
    pub accessories: Vec<String>,
    pub document_url: String,
    pub qr_code_url: String,
}

/// Intervention aggregate as served by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Intervention {
    pub id: i32,
    /// Sequential human-readable number, immutable once assigned
    pub reference: String,
    pub client_id: i32,
    pub device: DeviceRef,
    pub loaner_device_id: Option<i32>,
    pub status: InterventionStatus,
    pub intervention_type: InterventionType,
    pub technician: Option<String>,
    pub description: String,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub planned_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub labor_hours: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub parts: Vec<PartUsage>,
    pub deposit: Option<WorkshopDeposit>,
    /// labor + parts, recomputed on every read
    pub total_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Raw database row; the device reference and deposit are unpacked into
/// their model shapes by the repository.
#[derive(Debug, Clone, FromRow)]
pub struct InterventionRow {
    pub id: i32,
    pub reference: String,
    pub client_id: i32,
    pub device_id: Option<i32>,
    pub adhoc_device_type: Option<String>,
    pub adhoc_brand: Option<String>,
    pub adhoc_model: Option<String>,
    pub adhoc_serial_number: Option<String>,
    pub loaner_device_id: Option<i32>,
    pub status: i16,
    pub intervention_type: i16,
    pub technician: Option<String>,
    pub description: String,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub planned_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub labor_hours: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub deposit_date: Option<DateTime<Utc>>,
    pub deposit_photos: Option<sqlx::types::Json<Vec<String>>>,
    pub deposit_accessories: Option<sqlx::types::Json<Vec<String>>>,
    pub deposit_document_url: Option<String>,
    pub deposit_qr_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl InterventionRow {
    pub fn device_ref(&self) -> DeviceRef {
        match self.device_id {
            Some(device_id) => DeviceRef::Registered { device_id },
            None => DeviceRef::AdHoc {
                device_type: self.adhoc_device_type.clone().unwrap_or_default(),
                brand: self.adhoc_brand.clone(),
                model: self.adhoc_model.clone(),
                serial_number: self.adhoc_serial_number.clone(),
            },
        }
    }

    pub fn deposit(&self) -> Option<WorkshopDeposit> {
        self.deposit_date.map(|deposit_date| WorkshopDeposit {
            deposit_date,
            photos: self.deposit_photos.clone().map(|j| j.0).unwrap_or_default(),
            accessories: self.deposit_accessories.clone().map(|j| j.0).unwrap_or_default(),
            document_url: self.deposit_document_url.clone().unwrap_or_default(),
            qr_code_url: self.deposit_qr_url.clone().unwrap_or_default(),
        })
    }

    pub fn into_intervention(self, parts: Vec<PartUsage>) -> Intervention {
        let device = self.device_ref();
        let deposit = self.deposit();
        let total_cost = total_cost(self.labor_hours, self.hourly_rate, &parts);
        Intervention {
            id: self.id,
            reference: self.reference,
            client_id: self.client_id,
            device,
            loaner_device_id: self.loaner_device_id,
            status: InterventionStatus::from(self.status),
            intervention_type: InterventionType::from(self.intervention_type),
            technician: self.technician,
            description: self.description,
            diagnosis: self.diagnosis,
            notes: self.notes,
            planned_date: self.planned_date,
            completed_date: self.completed_date,
            labor_hours: self.labor_hours,
            hourly_rate: self.hourly_rate,
            parts,
            deposit,
            total_cost,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Total cost = labor hours × hourly rate + Σ(quantity × unit price).
/// Missing labor fields count as zero.
pub fn total_cost(
    labor_hours: Option<Decimal>,
    hourly_rate: Option<Decimal>,
    parts: &[PartUsage],
) -> Decimal {
    let labor = match (labor_hours, hourly_rate) {
        (Some(hours), Some(rate)) => hours * rate,
        _ => Decimal::ZERO,
    };
    parts
        .iter()
        .fold(labor, |acc, p| acc + Decimal::from(p.quantity) * p.unit_price)
}

/// Create intervention request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateIntervention {
    pub client_id: i32,
    pub device: DeviceRef,
    pub loaner_device_id: Option<i32>,
    pub intervention_type: Option<InterventionType>,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub technician: Option<String>,
    pub planned_date: Option<DateTime<Utc>>,
}

/// Partial update request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateIntervention {
    pub status: Option<InterventionStatus>,
    pub intervention_type: Option<InterventionType>,
    pub technician: Option<String>,
    pub description: Option<String>,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub planned_date: Option<DateTime<Utc>>,
    pub labor_hours: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
}

/// Record a spare-part usage on an intervention
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordPartUsage {
    pub part_id: i32,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
}

/// Commit the workshop deposit (step 4 of the intake sub-flow)
#[derive(Debug, Deserialize, ToSchema)]
pub struct CommitDeposit {
    pub photos: Vec<String>,
    pub accessories: Vec<String>,
}

/// List query
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct InterventionQuery {
    /// Filter by status code
    pub status: Option<InterventionStatus>,
    pub client_id: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usage(quantity: i32, unit_price: Decimal) -> PartUsage {
        PartUsage {
            id: 0,
            intervention_id: 1,
            part_id: 1,
            part_reference: "REF".to_string(),
            part_designation: "Pièce".to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_total_cost_labor_and_parts() {
        let parts = vec![usage(2, dec!(12.50)), usage(1, dec!(4.00))];
        let total = total_cost(Some(dec!(1.5)), Some(dec!(60)), &parts);
        assert_eq!(total, dec!(119.00));
    }

    #[test]
    fn test_total_cost_without_labor() {
        let parts = vec![usage(3, dec!(10))];
        assert_eq!(total_cost(None, Some(dec!(60)), &parts), dec!(30));
        assert_eq!(total_cost(Some(dec!(2)), None, &parts), dec!(30));
    }

    #[test]
    fn test_total_cost_empty() {
        assert_eq!(total_cost(None, None, &[]), Decimal::ZERO);
    }

    #[test]
    fn test_device_ref_unpacking() {
        let mut row = InterventionRow {
            id: 1,
            reference: "INT-000001".to_string(),
            client_id: 1,
            device_id: Some(7),
            adhoc_device_type: None,
            adhoc_brand: None,
            adhoc_model: None,
            adhoc_serial_number: None,
            loaner_device_id: None,
            status: 0,
            intervention_type: 0,
            technician: None,
            description: "Fuite".to_string(),
            diagnosis: None,
            notes: None,
            planned_date: None,
            completed_date: None,
            labor_hours: None,
            hourly_rate: None,
            deposit_date: None,
            deposit_photos: None,
            deposit_accessories: None,
            deposit_document_url: None,
            deposit_qr_url: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        assert!(matches!(row.device_ref(), DeviceRef::Registered { device_id: 7 }));

        row.device_id = None;
        row.adhoc_device_type = Some("Lave-linge".to_string());
        match row.device_ref() {
            DeviceRef::AdHoc { device_type, .. } => assert_eq!(device_type, "Lave-linge"),
            _ => panic!("expected ad-hoc device"),
        }
    }

    #[test]
    fn test_deposit_absent_until_committed() {
        let row = InterventionRow {
            id: 1,
            reference: "INT-000001".to_string(),
            client_id: 1,
            device_id: Some(1),
            adhoc_device_type: None,
            adhoc_brand: None,
            adhoc_model: None,
            adhoc_serial_number: None,
            loaner_device_id: None,
            status: 1,
            intervention_type: 0,
            technician: None,
            description: "Panne".to_string(),
            diagnosis: None,
            notes: None,
            planned_date: None,
            completed_date: None,
            labor_hours: None,
            hourly_rate: None,
            deposit_date: None,
            deposit_photos: Some(sqlx::types::Json(vec!["p1.jpg".to_string()])),
            deposit_accessories: None,
            deposit_document_url: None,
            deposit_qr_url: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        // No deposit date means no deposit, whatever else is in the columns
        assert!(row.deposit().is_none());
    }
}
