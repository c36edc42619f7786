//! Inventory updates with change tracking, change history and stock status.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use backoffice_core::{CategoryId, InventoryId};
use backoffice_inventory::{
    ChangeHistoryPolicy, InventoryChange, InventoryStatus, InventoryUpdate, TrackedUpdate,
};

use super::ServiceError;
use crate::store::RecordStore;

/// Stock status of one item, or of every item in a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InventoryStatusReport {
    Item(InventoryStatus),
    Category {
        cat_id: CategoryId,
        items: Vec<InventoryStatus>,
    },
}

/// Applies inventory updates and records them under a history policy.
#[derive(Debug, Clone)]
pub struct InventoryChangeTracker<S> {
    store: S,
    policy: ChangeHistoryPolicy,
}

impl<S> InventoryChangeTracker<S>
where
    S: RecordStore,
{
    pub fn new(store: S, policy: ChangeHistoryPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> ChangeHistoryPolicy {
        self.policy
    }

    /// Apply `update` to `inv_id`, stamped with the current time.
    pub async fn update(
        &self,
        inv_id: InventoryId,
        update: &InventoryUpdate,
    ) -> Result<TrackedUpdate, ServiceError> {
        self.update_at(inv_id, update, Utc::now()).await
    }

    #[instrument(skip(self), fields(policy = %self.policy), err)]
    pub async fn update_at(
        &self,
        inv_id: InventoryId,
        update: &InventoryUpdate,
        now: DateTime<Utc>,
    ) -> Result<TrackedUpdate, ServiceError> {
        update.validate()?;
        let tracked = self
            .store
            .apply_inventory_update(inv_id, update, self.policy, now)
            .await?;

        tracing::info!(
            inv_id = %inv_id,
            current_stock = tracked.item.current_stock,
            unit_price = tracked.item.unit_price,
            change_id = tracked.change.as_ref().map(|c| c.ch_id.get()),
            "inventory updated"
        );
        Ok(tracked)
    }

    /// Change history of an item, oldest first.
    ///
    /// Unknown items and items without recorded changes are both `NotFound`.
    #[instrument(skip(self), err)]
    pub async fn track(&self, inv_id: InventoryId) -> Result<Vec<InventoryChange>, ServiceError> {
        if self.store.get_inventory_item(inv_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!(
                "inventory item {inv_id} not found"
            )));
        }

        let changes = self.store.inventory_changes(inv_id).await?;
        if changes.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "no changes recorded for inventory item {inv_id}"
            )));
        }
        Ok(changes)
    }

    /// Stock status by item, or by category when no item is given.
    #[instrument(skip(self), err)]
    pub async fn status(
        &self,
        inv_id: Option<InventoryId>,
        cat_id: Option<CategoryId>,
    ) -> Result<InventoryStatusReport, ServiceError> {
        match (inv_id, cat_id) {
            (Some(inv_id), _) => self
                .store
                .get_inventory_item(inv_id)
                .await?
                .map(|item| InventoryStatusReport::Item(item.status()))
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("inventory item {inv_id} not found"))
                }),
            (None, Some(cat_id)) => {
                if self.store.get_category(cat_id).await?.is_none() {
                    return Err(ServiceError::NotFound(format!("category {cat_id} not found")));
                }
                let items: Vec<InventoryStatus> = self
                    .store
                    .inventory_by_category(cat_id)
                    .await?
                    .iter()
                    .map(|item| item.status())
                    .collect();
                if items.is_empty() {
                    return Err(ServiceError::NotFound(format!(
                        "no inventory in category {cat_id}"
                    )));
                }
                Ok(InventoryStatusReport::Category { cat_id, items })
            }
            (None, None) => Err(ServiceError::Validation(
                "either inv_id or cat_id is required".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use backoffice_inventory::{Category, InventoryItem};
    use chrono::{Duration, TimeZone};

    use crate::store::InMemoryRecordStore;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    async fn tracker(
        policy: ChangeHistoryPolicy,
    ) -> InventoryChangeTracker<Arc<InMemoryRecordStore>> {
        let store = Arc::new(InMemoryRecordStore::new());
        for (id, name) in [(1, "Electronics"), (2, "Books")] {
            store
                .insert_category(&Category::new(CategoryId::new(id), name).unwrap())
                .await
                .unwrap();
        }
        store
            .insert_inventory_item(&InventoryItem {
                inv_id: InventoryId::new(10),
                cat_id: CategoryId::new(1),
                current_stock: 5,
                unit_price: 100,
                low_stock_alert: "no".to_string(),
            })
            .await
            .unwrap();
        InventoryChangeTracker::new(store, policy)
    }

    fn update(stock: Option<i64>, price: Option<i64>) -> InventoryUpdate {
        InventoryUpdate {
            current_stock: stock,
            unit_price: price,
            cat_id: None,
        }
    }

    #[tokio::test]
    async fn stock_and_price_are_both_applied() {
        let t = tracker(ChangeHistoryPolicy::Rolling).await;
        let tracked = t
            .update_at(InventoryId::new(10), &update(Some(3), Some(120)), t0())
            .await
            .unwrap();
        assert_eq!(tracked.item.current_stock, 3);
        assert_eq!(tracked.item.unit_price, 120);

        let change = tracked.change.unwrap();
        assert_eq!(change.current_stock, Some(3));
        assert_eq!(change.unit_price, Some(120));
    }

    #[tokio::test]
    async fn rolling_history_overwrites_the_latest_row() {
        let t = tracker(ChangeHistoryPolicy::Rolling).await;
        let id = InventoryId::new(10);
        t.update_at(id, &update(Some(4), None), t0()).await.unwrap();
        t.update_at(id, &update(None, Some(90)), t0() + Duration::hours(1))
            .await
            .unwrap();

        let history = t.track(id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].current_stock, Some(4));
        assert_eq!(history[0].unit_price, Some(90));
    }

    #[tokio::test]
    async fn append_history_keeps_every_update() {
        let t = tracker(ChangeHistoryPolicy::Append).await;
        let id = InventoryId::new(10);
        t.update_at(id, &update(Some(4), None), t0()).await.unwrap();
        t.update_at(id, &update(None, Some(90)), t0() + Duration::hours(1))
            .await
            .unwrap();

        let history = t.track(id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].unit_price, Some(90));
        assert_eq!(history[1].current_stock, None);
    }

    #[tokio::test]
    async fn category_only_update_writes_no_change_row() {
        let t = tracker(ChangeHistoryPolicy::Rolling).await;
        let id = InventoryId::new(10);
        let tracked = t
            .update_at(
                id,
                &InventoryUpdate {
                    cat_id: Some(CategoryId::new(2)),
                    ..InventoryUpdate::default()
                },
                t0(),
            )
            .await
            .unwrap();
        assert_eq!(tracked.item.cat_id, CategoryId::new(2));
        assert!(tracked.change.is_none());
        assert!(matches!(t.track(id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let t = tracker(ChangeHistoryPolicy::Rolling).await;
        assert!(matches!(
            t.update_at(InventoryId::new(10), &InventoryUpdate::default(), t0()).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn unknown_item_is_not_found() {
        let t = tracker(ChangeHistoryPolicy::Rolling).await;
        assert!(matches!(
            t.update_at(InventoryId::new(77), &update(Some(1), None), t0()).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            t.track(InventoryId::new(77)).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn status_by_item_and_by_category() {
        let t = tracker(ChangeHistoryPolicy::Rolling).await;
        match t.status(Some(InventoryId::new(10)), None).await.unwrap() {
            InventoryStatusReport::Item(status) => assert_eq!(status.current_stock, 5),
            other => panic!("expected item status, got {other:?}"),
        }
        match t.status(None, Some(CategoryId::new(1))).await.unwrap() {
            InventoryStatusReport::Category { items, .. } => assert_eq!(items.len(), 1),
            other => panic!("expected category status, got {other:?}"),
        }
        assert!(matches!(
            t.status(None, Some(CategoryId::new(2))).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            t.status(None, None).await,
            Err(ServiceError::Validation(_))
        ));
    }
}
