//! Intervention workflow service

use std::sync::Arc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{InterventionStatus, InterventionType},
        intervention::{
            CommitDeposit, CreateIntervention, Intervention, InterventionQuery, PartUsage,
            RecordPartUsage, UpdateIntervention, ACCESSORY_CATALOG,
        },
    },
    repository::Repository,
    services::documents::{DepositDocumentRequest, DocumentGenerator},
};

#[derive(Clone)]
pub struct InterventionsService {
    repository: Repository,
    documents: Arc<dyn DocumentGenerator>,
}

impl InterventionsService {
    pub fn new(repository: Repository, documents: Arc<dyn DocumentGenerator>) -> Self {
        Self { repository, documents }
    }

    pub async fn list(&self, query: &InterventionQuery) -> AppResult<(Vec<Intervention>, i64)> {
        self.repository.interventions.list(query).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Intervention> {
        self.repository.interventions.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateIntervention) -> AppResult<Intervention> {
        data.validate().map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.interventions.create(data).await
    }

    pub async fn update(&self, id: i32, data: &UpdateIntervention) -> AppResult<Intervention> {
        self.repository.interventions.update(id, data).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.interventions.delete(id).await
    }

    /// Record a spare-part usage on an intervention, decrementing stock
    pub async fn record_part_usage(
        &self,
        intervention_id: i32,
        data: &RecordPartUsage,
    ) -> AppResult<PartUsage> {
        data.validate().map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository
            .interventions
            .record_part_usage(intervention_id, data.part_id, data.quantity)
            .await
    }

    /// Commit the workshop deposit (step 4 of the intake sub-flow).
    ///
    /// The document collaborator is called before anything is written; its
    /// failure therefore leaves the intervention untouched. The write itself
    /// is a single conditional UPDATE in the repository.
    pub async fn commit_deposit(&self, id: i32, data: &CommitDeposit) -> AppResult<Intervention> {
        let intervention = self.repository.interventions.get_by_id(id).await?;
        let request = deposit_request(&intervention, data)?;

        let document = self.documents.generate(&request).await?;

        self.repository
            .interventions
            .commit_deposit(
                id,
                &data.photos,
                &data.accessories,
                &document.document_url,
                &document.qr_code_url,
            )
            .await
    }
}

/// Validate the deposit preconditions and build the collaborator payload.
///
/// The deposit is only recordable on a workshop intervention in status
/// Planifié that has not been deposited yet, with accessories taken from the
/// fixed catalog.
fn deposit_request(
    intervention: &Intervention,
    data: &CommitDeposit,
) -> AppResult<DepositDocumentRequest> {
    if intervention.deposit.is_some() {
        return Err(AppError::AlreadyDeposited(format!(
            "Intervention {} has already been deposited",
            intervention.id
        )));
    }
    if intervention.intervention_type != InterventionType::Atelier {
        return Err(AppError::Conflict(format!(
            "Intervention {} is not a workshop intervention",
            intervention.id
        )));
    }
    if intervention.status != InterventionStatus::Planifie {
        return Err(AppError::Conflict(format!(
            "Intervention {} must be in status '{}' to record a deposit",
            intervention.id,
            InterventionStatus::Planifie
        )));
    }
    for accessory in &data.accessories {
        if !ACCESSORY_CATALOG.contains(&accessory.as_str()) {
            return Err(AppError::Validation(format!(
                "Unknown accessory '{}'",
                accessory
            )));
        }
    }

    Ok(DepositDocumentRequest {
        intervention_id: intervention.id,
        reference: intervention.reference.clone(),
        client_id: intervention.client_id,
        photos: data.photos.clone(),
        accessories: data.accessories.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::intervention::DeviceRef;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn intervention(
        status: InterventionStatus,
        intervention_type: InterventionType,
    ) -> Intervention {
        Intervention {
            id: 1,
            reference: "INT-000001".to_string(),
            client_id: 1,
            device: DeviceRef::Registered { device_id: 1 },
            loaner_device_id: None,
            status,
            intervention_type,
            technician: None,
            description: "Ne démarre plus".to_string(),
            diagnosis: None,
            notes: None,
            planned_date: None,
            completed_date: None,
            labor_hours: None,
            hourly_rate: None,
            parts: Vec::new(),
            deposit: None,
            total_cost: Decimal::ZERO,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn commit(accessories: &[&str]) -> CommitDeposit {
        CommitDeposit {
            photos: vec!["photo-1.jpg".to_string()],
            accessories: accessories.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_deposit_allowed_on_planned_workshop_intervention() {
        let i = intervention(InterventionStatus::Planifie, InterventionType::Atelier);
        let request = deposit_request(&i, &commit(&["Télécommande"])).unwrap();
        assert_eq!(request.reference, "INT-000001");
        assert_eq!(request.accessories, vec!["Télécommande".to_string()]);
    }

    #[test]
    fn test_deposit_rejected_outside_planned_status() {
        let i = intervention(InterventionStatus::Demande, InterventionType::Atelier);
        assert!(matches!(
            deposit_request(&i, &commit(&[])),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_deposit_rejected_for_home_intervention() {
        let i = intervention(InterventionStatus::Planifie, InterventionType::Domicile);
        assert!(matches!(
            deposit_request(&i, &commit(&[])),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_deposit_rejected_when_already_deposited() {
        let mut i = intervention(InterventionStatus::Planifie, InterventionType::Atelier);
        i.deposit = Some(crate::models::intervention::WorkshopDeposit {
            deposit_date: Utc::now(),
            photos: Vec::new(),
            accessories: Vec::new(),
            document_url: "http://docs/d.pdf".to_string(),
            qr_code_url: "http://docs/d.png".to_string(),
        });
        assert!(matches!(
            deposit_request(&i, &commit(&[])),
            Err(AppError::AlreadyDeposited(_))
        ));
    }

    #[test]
    fn test_deposit_rejects_accessory_outside_catalog() {
        let i = intervention(InterventionStatus::Planifie, InterventionType::Atelier);
        assert!(matches!(
            deposit_request(&i, &commit(&["Trébuchet"])),
            Err(AppError::Validation(_))
        ));
    }
}
