//! Integration tests for the full back-office pipeline.
//!
//! Tests: ExportFile → Ingestor → RecordStore → SalesQueryService / InventoryChangeTracker
//!
//! Verifies:
//! - Ingested data is visible to revenue and lookup queries
//! - Re-running an ingestion never duplicates records
//! - Inventory updates land in the change history

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use backoffice_core::{CategoryId, InventoryId};
    use backoffice_inventory::{ChangeHistoryPolicy, InventoryUpdate};
    use backoffice_sales::SalesFilter;

    use crate::ingest::{ExportFile, Ingestor};
    use crate::services::{InventoryChangeTracker, SalesQueryService};
    use crate::store::{InMemoryRecordStore, RecordStore, SharedStore};

    const BOOKS: &str = r#"{
        "category": [{"cat_id": 1, "cat_name": "Books"}],
        "inventory": [{"inv_id": 10, "cat_id": 1, "current_stock": 5, "unit_price": 20, "low_stock_alert": "no"}],
        "sales": [{"sale_id": 100, "inv_id": 10, "timestamp": "2024-01-10", "quantity_sold": 2, "price_per_quantity": 20}]
    }"#;

    async fn setup() -> SharedStore {
        let store: SharedStore = Arc::new(InMemoryRecordStore::new());
        let export = ExportFile::from_json(BOOKS).unwrap();
        Ingestor::new(store.clone()).ingest(&export).await.unwrap();
        store
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[tokio::test]
    async fn ingested_sale_counts_towards_monthly_revenue() {
        let sales = SalesQueryService::new(setup().await);
        let report = sales
            .revenue(Some(jan(1)), Some(jan(31)), Some("monthly"))
            .await
            .unwrap();
        assert_eq!(report.total_revenue, 40);
    }

    #[tokio::test]
    async fn reingestion_is_idempotent() {
        let store = setup().await;
        let export = ExportFile::from_json(BOOKS).unwrap();
        let report = Ingestor::new(store.clone()).ingest(&export).await.unwrap();
        assert_eq!(report.sales.inserted, 0);
        assert_eq!(report.sales.already_exists, 1);

        let sales = SalesQueryService::new(store.clone());
        let found = sales
            .filter_sales(&SalesFilter {
                category_id: Some(CategoryId::new(1)),
                ..SalesFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(sales.category_revenue(CategoryId::new(1)).await.unwrap(), 40);
    }

    #[tokio::test]
    async fn updates_are_tracked_and_visible_in_status() {
        let store = setup().await;
        let tracker = InventoryChangeTracker::new(store.clone(), ChangeHistoryPolicy::Rolling);
        let id = InventoryId::new(10);

        tracker
            .update(
                id,
                &InventoryUpdate {
                    current_stock: Some(3),
                    ..InventoryUpdate::default()
                },
            )
            .await
            .unwrap();

        let history = tracker.track(id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].current_stock, Some(3));

        let item = store.get_inventory_item(id).await.unwrap().unwrap();
        assert_eq!(item.current_stock, 3);
    }
}
