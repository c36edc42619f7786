//! Sales lookup filters and their precedence.

use chrono::NaiveDate;

use backoffice_core::{CategoryId, DomainError, DomainResult, InventoryId, SaleId};

use crate::period::Period;

/// Raw filter parameters of a sales lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesFilter {
    pub sale_id: Option<SaleId>,
    pub inventory_id: Option<InventoryId>,
    pub category_id: Option<CategoryId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// The single lookup a filter resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SalesQuery {
    BySale(SaleId),
    ByInventory(InventoryId),
    ByCategory(CategoryId),
    ByPeriod(Period),
}

impl SalesFilter {
    /// Pick the lookup to run.
    ///
    /// Precedence is sale id, inventory id, category id, then date range; the
    /// first supplied filter wins and the rest are ignored. A half-supplied
    /// date range is rejected even when another filter would win.
    pub fn resolve(&self) -> DomainResult<SalesQuery> {
        let period = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some(Period::new(start, end)?),
            (None, None) => None,
            _ => {
                return Err(DomainError::validation(
                    "date range requires both start_date and end_date",
                ));
            }
        };

        if let Some(id) = self.sale_id {
            return Ok(SalesQuery::BySale(id));
        }
        if let Some(id) = self.inventory_id {
            return Ok(SalesQuery::ByInventory(id));
        }
        if let Some(id) = self.category_id {
            return Ok(SalesQuery::ByCategory(id));
        }
        period.map(SalesQuery::ByPeriod).ok_or_else(|| {
            DomainError::validation(
                "at least one of sale_id, inventory_id, category_id or start_date/end_date is required",
            )
        })
    }
}
