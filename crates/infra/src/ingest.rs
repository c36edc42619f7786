//! Bulk load of an exported data file into a record store.
//!
//! The file is a JSON object with `category`, `inventory` and `sales` arrays.
//! Records are inserted parents first so references resolve regardless of key
//! order. Each record is decoded on its own, so a malformed record is rejected
//! without affecting its neighbours. Duplicates and rejected records are
//! counted and logged; only an unreachable store aborts the run.

use std::fmt::Display;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use backoffice_core::DomainError;
use backoffice_inventory::{Category, InventoryItem};
use backoffice_sales::Sale;

use crate::services::ServiceError;
use crate::store::{InsertOutcome, RecordStore, StoreError, StoreResult};

/// Export file with its records still undecoded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExportFile {
    #[serde(default)]
    pub category: Vec<Value>,
    #[serde(default)]
    pub inventory: Vec<Value>,
    #[serde(default)]
    pub sales: Vec<Value>,
}

impl ExportFile {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub inserted: usize,
    pub already_exists: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub entity: &'static str,
    pub id: String,
    pub reason: String,
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub categories: OutcomeCounts,
    pub inventory: OutcomeCounts,
    pub sales: OutcomeCounts,
    pub rejections: Vec<Rejection>,
}

pub struct Ingestor<S> {
    store: S,
}

impl<S> Ingestor<S>
where
    S: RecordStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(
        skip(self, export),
        fields(
            categories = export.category.len(),
            inventory = export.inventory.len(),
            sales = export.sales.len()
        ),
        err
    )]
    pub async fn ingest(&self, export: &ExportFile) -> Result<IngestReport, ServiceError> {
        let mut report = IngestReport::default();

        for (index, raw) in export.category.iter().enumerate() {
            let id = record_id(raw, "cat_id", index);
            let result = match decode::<Category>(raw) {
                Ok(category) => self.store.insert_category(&category).await,
                Err(e) => Err(e),
            };
            tally(&mut report, Entity::Category, id, result)?;
        }
        for (index, raw) in export.inventory.iter().enumerate() {
            let id = record_id(raw, "inv_id", index);
            let result = match decode::<InventoryItem>(raw) {
                Ok(item) => self.store.insert_inventory_item(&item).await,
                Err(e) => Err(e),
            };
            tally(&mut report, Entity::Inventory, id, result)?;
        }
        for (index, raw) in export.sales.iter().enumerate() {
            let id = record_id(raw, "sale_id", index);
            let result = match decode::<Sale>(raw) {
                Ok(sale) => self.store.insert_sale(&sale).await,
                Err(e) => Err(e),
            };
            tally(&mut report, Entity::Sale, id, result)?;
        }

        info!(
            categories_inserted = report.categories.inserted,
            inventory_inserted = report.inventory.inserted,
            sales_inserted = report.sales.inserted,
            rejected = report.rejections.len(),
            "ingestion finished"
        );
        Ok(report)
    }
}

#[derive(Debug, Clone, Copy)]
enum Entity {
    Category,
    Inventory,
    Sale,
}

impl Entity {
    fn name(self) -> &'static str {
        match self {
            Entity::Category => "category",
            Entity::Inventory => "inventory",
            Entity::Sale => "sale",
        }
    }
}

fn decode<T: DeserializeOwned>(raw: &Value) -> StoreResult<T> {
    T::deserialize(raw).map_err(|e| StoreError::Domain(DomainError::validation(e.to_string())))
}

/// Key of a raw record, or its position when the key is missing.
fn record_id(raw: &Value, key: &str, index: usize) -> String {
    match raw.get(key) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => format!("#{index}"),
    }
}

fn tally(
    report: &mut IngestReport,
    entity: Entity,
    id: impl Display,
    result: StoreResult<InsertOutcome>,
) -> Result<(), ServiceError> {
    let counts = match entity {
        Entity::Category => &mut report.categories,
        Entity::Inventory => &mut report.inventory,
        Entity::Sale => &mut report.sales,
    };

    match result {
        Ok(InsertOutcome::Inserted) => counts.inserted += 1,
        Ok(InsertOutcome::AlreadyExists) => {
            warn!(entity = entity.name(), id = %id, "record already present; skipped");
            counts.already_exists += 1;
        }
        Err(e @ StoreError::Unavailable(_)) => return Err(e.into()),
        Err(reason) => {
            warn!(entity = entity.name(), id = %id, error = %reason, "record rejected");
            counts.rejected += 1;
            report.rejections.push(Rejection {
                entity: entity.name(),
                id: id.to_string(),
                reason: reason.to_string(),
            });
        }
    }
    Ok(())
}
