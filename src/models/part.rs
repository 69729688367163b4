//! Spare part model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Spare part record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Part {
    pub id: i32,
    /// Manufacturer or internal reference, unique across the stock
    pub reference: String,
    pub designation: String,
    pub brand: Option<String>,
    pub compatible_models: Option<String>,
    pub stock_quantity: i32,
    pub min_quantity: i32,
    pub purchase_price: Option<Decimal>,
    pub sale_price: Decimal,
    pub supplier: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Part {
    /// Stock alert predicate: below the configured minimum
    pub fn in_alert(&self) -> bool {
        self.stock_quantity < self.min_quantity
    }
}

/// Create part request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePart {
    #[validate(length(min = 1, message = "reference is required"))]
    pub reference: String,
    #[validate(length(min = 1, message = "designation is required"))]
    pub designation: String,
    pub brand: Option<String>,
    pub compatible_models: Option<String>,
    #[validate(range(min = 0))]
    pub stock_quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub min_quantity: Option<i32>,
    pub purchase_price: Option<Decimal>,
    pub sale_price: Decimal,
    pub supplier: Option<String>,
}

/// Update part request (absolute stock set is administrative)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePart {
    pub reference: Option<String>,
    pub designation: Option<String>,
    pub brand: Option<String>,
    pub compatible_models: Option<String>,
    #[validate(range(min = 0))]
    pub stock_quantity: Option<i32>,
    #[validate(range(min = 0))]
    pub min_quantity: Option<i32>,
    pub purchase_price: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub supplier: Option<String>,
    pub active: Option<bool>,
}

/// Stock alert listing
#[derive(Debug, Serialize, ToSchema)]
pub struct StockAlerts {
    pub count: i64,
    pub parts: Vec<Part>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn part(stock: i32, min: i32) -> Part {
        Part {
            id: 1,
            reference: "BLC-42".to_string(),
            designation: "Courroie tambour".to_string(),
            brand: None,
            compatible_models: None,
            stock_quantity: stock,
            min_quantity: min,
            purchase_price: None,
            sale_price: dec!(19.90),
            supplier: None,
            active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_alert_predicate() {
        assert!(part(3, 5).in_alert());
        assert!(!part(5, 5).in_alert());
        assert!(!part(8, 5).in_alert());
        assert!(part(0, 1).in_alert());
    }
}
