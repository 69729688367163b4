//! Loan model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::LoanStatus;

/// Loan record from database.
///
/// A loan is open while `returned_date` is null. The reported status
/// (`En cours` / `Retourné` / `Retard`) is derived, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub loaner_device_id: i32,
    pub client_id: i32,
    pub intervention_id: Option<i32>,
    pub loan_date: DateTime<Utc>,
    pub expected_return_date: Option<DateTime<Utc>>,
    pub returned_date: Option<DateTime<Utc>>,
    pub condition_at_loan: Option<String>,
    pub condition_at_return: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.returned_date.is_none()
    }

    /// Derive the reported status at `now`
    pub fn status_at(&self, now: DateTime<Utc>) -> LoanStatus {
        if self.returned_date.is_some() {
            LoanStatus::Retourne
        } else if self.expected_return_date.map(|d| d < now).unwrap_or(false) {
            LoanStatus::Retard
        } else {
            LoanStatus::EnCours
        }
    }
}

/// Loan with derived status and display fields
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub loaner_device_id: i32,
    pub loaner_device_name: String,
    pub client_id: i32,
    pub client_name: String,
    pub intervention_id: Option<i32>,
    pub loan_date: DateTime<Utc>,
    pub expected_return_date: Option<DateTime<Utc>>,
    pub returned_date: Option<DateTime<Utc>>,
    pub condition_at_loan: Option<String>,
    pub condition_at_return: Option<String>,
    pub notes: Option<String>,
    pub status: LoanStatus,
}

/// Open loan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub loaner_device_id: i32,
    pub client_id: i32,
    pub intervention_id: Option<i32>,
    pub expected_return_date: Option<DateTime<Utc>>,
    pub condition_at_loan: Option<String>,
    pub notes: Option<String>,
}

/// Close loan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnLoan {
    pub condition_at_return: Option<String>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn loan(expected: Option<DateTime<Utc>>, returned: Option<DateTime<Utc>>) -> Loan {
        Loan {
            id: 1,
            loaner_device_id: 1,
            client_id: 1,
            intervention_id: None,
            loan_date: Utc::now(),
            expected_return_date: expected,
            returned_date: returned,
            condition_at_loan: None,
            condition_at_return: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_open_loan_within_expected_window() {
        let now = Utc::now();
        let l = loan(Some(now + Duration::days(7)), None);
        assert!(l.is_open());
        assert_eq!(l.status_at(now), LoanStatus::EnCours);
    }

    #[test]
    fn test_overdue_is_derived_not_stored() {
        let now = Utc::now();
        let l = loan(Some(now - Duration::days(1)), None);
        assert_eq!(l.status_at(now), LoanStatus::Retard);
        // Same row reads as on-time before the deadline
        assert_eq!(l.status_at(now - Duration::days(2)), LoanStatus::EnCours);
    }

    #[test]
    fn test_returned_loan_is_never_late() {
        let now = Utc::now();
        let l = loan(Some(now - Duration::days(10)), Some(now - Duration::days(3)));
        assert!(!l.is_open());
        assert_eq!(l.status_at(now), LoanStatus::Retourne);
    }

    #[test]
    fn test_no_expected_date_means_no_late() {
        let now = Utc::now();
        let l = loan(None, None);
        assert_eq!(l.status_at(now), LoanStatus::EnCours);
    }
}
