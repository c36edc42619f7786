use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;

use backoffice_core::{CategoryId, DomainError, InventoryId, SaleId};
use backoffice_infra::services::RevenueReport;
use backoffice_inventory::{InventoryUpdate, TrackedUpdate};
use backoffice_sales::{parse_date, ComparisonRequest, SalesFilter};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------
//
// Query parameters arrive as strings and are parsed here so malformed values
// produce the same JSON error body as every other validation failure.
// Blank values count as absent.

#[derive(Debug, Default, Deserialize)]
pub struct SalesFilterQuery {
    pub sale_id: Option<String>,
    pub inventory_id: Option<String>,
    pub category_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl SalesFilterQuery {
    pub fn into_filter(self) -> Result<SalesFilter, axum::response::Response> {
        Ok(SalesFilter {
            sale_id: parse_param::<SaleId>(self.sale_id)?,
            inventory_id: parse_param::<InventoryId>(self.inventory_id)?,
            category_id: parse_param::<CategoryId>(self.category_id)?,
            start_date: date_param(self.start_date)?,
            end_date: date_param(self.end_date)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RevenueQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub interval: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompareQuery {
    pub category1: Option<String>,
    pub category2: Option<String>,
    pub start_date1: Option<String>,
    pub end_date1: Option<String>,
    pub start_date2: Option<String>,
    pub end_date2: Option<String>,
}

impl CompareQuery {
    pub fn into_request(self) -> Result<ComparisonRequest, axum::response::Response> {
        Ok(ComparisonRequest {
            category1: parse_param::<CategoryId>(self.category1)?,
            category2: parse_param::<CategoryId>(self.category2)?,
            start_date1: date_param(self.start_date1)?,
            end_date1: date_param(self.end_date1)?,
            start_date2: date_param(self.start_date2)?,
            end_date2: date_param(self.end_date2)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub inv_id: Option<String>,
    pub cat_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrackQuery {
    pub inv_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInventoryRequest {
    pub inv_id: Option<InventoryId>,
    #[serde(flatten)]
    pub update: InventoryUpdate,
}

pub fn parse_param<T>(raw: Option<String>) -> Result<Option<T>, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    present(raw)
        .map(|v| v.parse::<T>())
        .transpose()
        .map_err(errors::domain_error_to_response)
}

pub fn date_param(raw: Option<String>) -> Result<Option<NaiveDate>, axum::response::Response> {
    present(raw)
        .map(|v| parse_date(&v))
        .transpose()
        .map_err(errors::domain_error_to_response)
}

pub fn present(raw: Option<String>) -> Option<String> {
    raw.filter(|v| !v.trim().is_empty())
}

// -------------------------
// Response mapping
// -------------------------

pub fn revenue_to_json(report: RevenueReport) -> serde_json::Value {
    let start = report.period.start();
    let end = report.period.end();
    serde_json::json!({
        "message": format!("Total revenue from {start} to {end}"),
        "start_date": start.to_string(),
        "end_date": end.to_string(),
        "interval": report.interval.map(|i| i.as_str()),
        "total_revenue": report.total_revenue,
    })
}

pub fn tracked_update_to_json(tracked: TrackedUpdate) -> serde_json::Value {
    serde_json::json!({
        "message": format!("Inventory item {} updated", tracked.item.inv_id),
        "item": tracked.item,
        "change": tracked.change,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_params_are_absent() {
        assert_eq!(parse_param::<SaleId>(Some("  ".into())).unwrap(), None);
        assert_eq!(date_param(None).unwrap(), None);
    }

    #[test]
    fn malformed_ids_are_bad_requests() {
        let resp = parse_param::<SaleId>(Some("abc".into())).unwrap_err();
        assert_eq!(resp.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn update_body_flattens_fields() {
        let body: UpdateInventoryRequest =
            serde_json::from_str(r#"{"inv_id": 10, "unit_price": 25}"#).unwrap();
        assert_eq!(body.inv_id, Some(InventoryId::new(10)));
        assert_eq!(body.update.unit_price, Some(25));
        assert_eq!(body.update.current_stock, None);
    }
}
