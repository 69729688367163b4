//! Shared domain enums (status codes stored as smallint)

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// InterventionStatus
// ---------------------------------------------------------------------------

/// Intervention workflow status.
///
/// The canonical progression is Demande → Planifié → En cours → Diagnostic →
/// Réparation → Terminé → Facturé, but operators may move a record to any
/// defined status in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum InterventionStatus {
    #[serde(rename = "Demande")]
    Demande = 0,
    #[serde(rename = "Planifié")]
    Planifie = 1,
    #[serde(rename = "En cours")]
    EnCours = 2,
    #[serde(rename = "Diagnostic")]
    Diagnostic = 3,
    #[serde(rename = "Réparation")]
    Reparation = 4,
    #[serde(rename = "Terminé")]
    Termine = 5,
    #[serde(rename = "Facturé")]
    Facture = 6,
}

impl InterventionStatus {
    /// Statuses marking the work itself as finished; entering one of them
    /// stamps the intervention's completion date.
    pub fn is_completed(self) -> bool {
        matches!(self, InterventionStatus::Termine | InterventionStatus::Facture)
    }
}

impl From<i16> for InterventionStatus {
    fn from(v: i16) -> Self {
        match v {
            1 => InterventionStatus::Planifie,
            2 => InterventionStatus::EnCours,
            3 => InterventionStatus::Diagnostic,
            4 => InterventionStatus::Reparation,
            5 => InterventionStatus::Termine,
            6 => InterventionStatus::Facture,
            _ => InterventionStatus::Demande,
        }
    }
}

impl From<InterventionStatus> for i16 {
    fn from(s: InterventionStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for InterventionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            InterventionStatus::Demande => "Demande",
            InterventionStatus::Planifie => "Planifié",
            InterventionStatus::EnCours => "En cours",
            InterventionStatus::Diagnostic => "Diagnostic",
            InterventionStatus::Reparation => "Réparation",
            InterventionStatus::Termine => "Terminé",
            InterventionStatus::Facture => "Facturé",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// InterventionType
// ---------------------------------------------------------------------------

/// Where the repair takes place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum InterventionType {
    #[serde(rename = "Atelier")]
    Atelier = 0,
    #[serde(rename = "À domicile")]
    Domicile = 1,
}

impl From<i16> for InterventionType {
    fn from(v: i16) -> Self {
        match v {
            1 => InterventionType::Domicile,
            _ => InterventionType::Atelier,
        }
    }
}

impl From<InterventionType> for i16 {
    fn from(t: InterventionType) -> Self {
        t as i16
    }
}

impl std::fmt::Display for InterventionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            InterventionType::Atelier => "Atelier",
            InterventionType::Domicile => "À domicile",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// LoanerDeviceStatus
// ---------------------------------------------------------------------------

/// Loaner device availability.
///
/// `Prete` is set and cleared exclusively by opening and closing loans;
/// operators may only toggle between `Disponible` and `EnMaintenance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum LoanerDeviceStatus {
    #[serde(rename = "Disponible")]
    Disponible = 0,
    #[serde(rename = "Prêté")]
    Prete = 1,
    #[serde(rename = "En maintenance")]
    EnMaintenance = 2,
}

impl From<i16> for LoanerDeviceStatus {
    fn from(v: i16) -> Self {
        match v {
            1 => LoanerDeviceStatus::Prete,
            2 => LoanerDeviceStatus::EnMaintenance,
            _ => LoanerDeviceStatus::Disponible,
        }
    }
}

impl From<LoanerDeviceStatus> for i16 {
    fn from(s: LoanerDeviceStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for LoanerDeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoanerDeviceStatus::Disponible => "Disponible",
            LoanerDeviceStatus::Prete => "Prêté",
            LoanerDeviceStatus::EnMaintenance => "En maintenance",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// LoanStatus
// ---------------------------------------------------------------------------

/// Loan status as reported to clients.
///
/// Only open/returned is stored; `Retard` is derived at read time from the
/// expected return date so no background job has to tick loans over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    #[serde(rename = "En cours")]
    EnCours,
    #[serde(rename = "Retourné")]
    Retourne,
    #[serde(rename = "Retard")]
    Retard,
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoanStatus::EnCours => "En cours",
            LoanStatus::Retourne => "Retourné",
            LoanStatus::Retard => "Retard",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intervention_status_roundtrip() {
        for code in 0..=6i16 {
            let status = InterventionStatus::from(code);
            assert_eq!(i16::from(status), code);
        }
        // Unknown codes fall back to Demande
        assert_eq!(InterventionStatus::from(42), InterventionStatus::Demande);
    }

    #[test]
    fn test_completed_statuses() {
        assert!(InterventionStatus::Termine.is_completed());
        assert!(InterventionStatus::Facture.is_completed());
        assert!(!InterventionStatus::Reparation.is_completed());
        assert!(!InterventionStatus::Demande.is_completed());
    }

    #[test]
    fn test_loaner_status_labels() {
        assert_eq!(LoanerDeviceStatus::Prete.to_string(), "Prêté");
        assert_eq!(LoanerDeviceStatus::from(2), LoanerDeviceStatus::EnMaintenance);
        assert_eq!(LoanerDeviceStatus::from(-1), LoanerDeviceStatus::Disponible);
    }
}
