use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use backoffice_core::{CategoryId, DomainError, InventoryId, SaleId};
use backoffice_inventory::{
    Category, ChangeHistoryPolicy, InventoryChange, InventoryItem, InventoryUpdate, TrackedUpdate,
};
use backoffice_sales::{Period, Sale};

/// Record store operation error.
///
/// These are **infrastructure errors** (connectivity, decoding) plus domain
/// errors raised while the store enforces references or runs a tracked update.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached (pool timeout, I/O, closed pool).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be decoded into a domain record.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// Any other backend failure.
    #[error("store backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of an insert keyed by primary key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertOutcome {
    Inserted,
    /// A record with the same primary key was already present; nothing was written.
    AlreadyExists,
}

/// Relational persistence of the four record types.
///
/// ## Contract
///
/// - Inserts check for an existing primary key first and report
///   `AlreadyExists` instead of failing.
/// - Inserts referencing a missing parent (category of an item, item of a
///   sale) fail with `DomainError::InvariantViolation`.
/// - Sale lists are ordered by timestamp, then sale id. Change rows are
///   ordered by `ch_date`, then `ch_id`.
/// - `apply_inventory_update` is atomic: the item and its change row are
///   both written or neither is.
/// - Connectivity failures surface as `StoreError::Unavailable`, never as an
///   empty result.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_category(&self, category: &Category) -> StoreResult<InsertOutcome>;

    async fn insert_inventory_item(&self, item: &InventoryItem) -> StoreResult<InsertOutcome>;

    async fn insert_sale(&self, sale: &Sale) -> StoreResult<InsertOutcome>;

    async fn get_category(&self, cat_id: CategoryId) -> StoreResult<Option<Category>>;

    async fn get_inventory_item(&self, inv_id: InventoryId) -> StoreResult<Option<InventoryItem>>;

    /// Items of a category, by `inv_id`.
    async fn inventory_by_category(&self, cat_id: CategoryId) -> StoreResult<Vec<InventoryItem>>;

    async fn get_sale(&self, sale_id: SaleId) -> StoreResult<Option<Sale>>;

    async fn sales_by_inventory(&self, inv_id: InventoryId) -> StoreResult<Vec<Sale>>;

    /// Union of the sales of several items.
    async fn sales_by_inventory_ids(&self, inv_ids: &[InventoryId]) -> StoreResult<Vec<Sale>>;

    /// Sales whose timestamp falls on one of the period's days.
    async fn sales_in_period(&self, period: &Period) -> StoreResult<Vec<Sale>>;

    /// Apply `update` to the item and record the change row the policy asks for.
    async fn apply_inventory_update(
        &self,
        inv_id: InventoryId,
        update: &InventoryUpdate,
        policy: ChangeHistoryPolicy,
        now: DateTime<Utc>,
    ) -> StoreResult<TrackedUpdate>;

    async fn inventory_changes(&self, inv_id: InventoryId) -> StoreResult<Vec<InventoryChange>>;
}

/// Store handle shared by the services of one process.
pub type SharedStore = Arc<dyn RecordStore>;

#[async_trait::async_trait]
impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    async fn insert_category(&self, category: &Category) -> StoreResult<InsertOutcome> {
        (**self).insert_category(category).await
    }

    async fn insert_inventory_item(&self, item: &InventoryItem) -> StoreResult<InsertOutcome> {
        (**self).insert_inventory_item(item).await
    }

    async fn insert_sale(&self, sale: &Sale) -> StoreResult<InsertOutcome> {
        (**self).insert_sale(sale).await
    }

    async fn get_category(&self, cat_id: CategoryId) -> StoreResult<Option<Category>> {
        (**self).get_category(cat_id).await
    }

    async fn get_inventory_item(&self, inv_id: InventoryId) -> StoreResult<Option<InventoryItem>> {
        (**self).get_inventory_item(inv_id).await
    }

    async fn inventory_by_category(&self, cat_id: CategoryId) -> StoreResult<Vec<InventoryItem>> {
        (**self).inventory_by_category(cat_id).await
    }

    async fn get_sale(&self, sale_id: SaleId) -> StoreResult<Option<Sale>> {
        (**self).get_sale(sale_id).await
    }

    async fn sales_by_inventory(&self, inv_id: InventoryId) -> StoreResult<Vec<Sale>> {
        (**self).sales_by_inventory(inv_id).await
    }

    async fn sales_by_inventory_ids(&self, inv_ids: &[InventoryId]) -> StoreResult<Vec<Sale>> {
        (**self).sales_by_inventory_ids(inv_ids).await
    }

    async fn sales_in_period(&self, period: &Period) -> StoreResult<Vec<Sale>> {
        (**self).sales_in_period(period).await
    }

    async fn apply_inventory_update(
        &self,
        inv_id: InventoryId,
        update: &InventoryUpdate,
        policy: ChangeHistoryPolicy,
        now: DateTime<Utc>,
    ) -> StoreResult<TrackedUpdate> {
        (**self)
            .apply_inventory_update(inv_id, update, policy, now)
            .await
    }

    async fn inventory_changes(&self, inv_id: InventoryId) -> StoreResult<Vec<InventoryChange>> {
        (**self).inventory_changes(inv_id).await
    }
}
