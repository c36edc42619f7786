use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backoffice_core::{DomainError, DomainResult, Entity, InventoryId, SaleId};

/// A single sale. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub sale_id: SaleId,
    pub inv_id: InventoryId,
    #[serde(deserialize_with = "crate::time::deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub quantity_sold: i64,
    /// Price in the smallest currency unit.
    pub price_per_quantity: i64,
}

impl Sale {
    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity_sold <= 0 {
            return Err(DomainError::validation(format!(
                "sale {}: quantity_sold must be positive",
                self.sale_id
            )));
        }
        if self.price_per_quantity <= 0 {
            return Err(DomainError::validation(format!(
                "sale {}: price_per_quantity must be positive",
                self.sale_id
            )));
        }
        Ok(())
    }

    /// `quantity_sold * price_per_quantity`.
    pub fn line_revenue(&self) -> DomainResult<i64> {
        self.quantity_sold
            .checked_mul(self.price_per_quantity)
            .ok_or_else(|| {
                DomainError::arithmetic(format!("sale {}: revenue overflows", self.sale_id))
            })
    }
}

impl Entity for Sale {
    type Id = SaleId;

    fn id(&self) -> SaleId {
        self.sale_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_export_timestamps() {
        let sale: Sale = serde_json::from_str(
            r#"{"sale_id": 100, "inv_id": 10, "timestamp": "2024-01-10 14:30:00",
                "quantity_sold": 2, "price_per_quantity": 20}"#,
        )
        .unwrap();
        assert_eq!(sale.timestamp.to_rfc3339(), "2024-01-10T14:30:00+00:00");
        assert_eq!(sale.line_revenue().unwrap(), 40);
    }

    #[test]
    fn non_positive_quantities_are_rejected() {
        let sale = Sale {
            sale_id: SaleId::new(1),
            inv_id: InventoryId::new(1),
            timestamp: Utc::now(),
            quantity_sold: 0,
            price_per_quantity: 5,
        };
        assert!(matches!(sale.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn overflowing_revenue_is_an_arithmetic_fault() {
        let sale = Sale {
            sale_id: SaleId::new(1),
            inv_id: InventoryId::new(1),
            timestamp: Utc::now(),
            quantity_sold: i64::MAX,
            price_per_quantity: 2,
        };
        assert!(matches!(sale.line_revenue(), Err(DomainError::ArithmeticFault(_))));
    }
}
