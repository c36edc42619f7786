use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use backoffice_core::{CategoryId, ChangeId, DomainError, Entity, InventoryId, SaleId};
use backoffice_inventory::{
    latest_change, plan_change, Category, ChangeHistoryPolicy, ChangeWrite, InventoryChange,
    InventoryItem, InventoryUpdate, TrackedUpdate,
};
use backoffice_sales::{Period, Sale};

use super::r#trait::{InsertOutcome, RecordStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    categories: BTreeMap<CategoryId, Category>,
    inventory: BTreeMap<InventoryId, InventoryItem>,
    sales: BTreeMap<SaleId, Sale>,
    changes: BTreeMap<ChangeId, InventoryChange>,
    last_change_id: i64,
}

/// In-memory record store.
///
/// Intended for tests/dev. Enforces the same references and orderings as the
/// Postgres store; a single write lock makes tracked updates atomic.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable backend: every call fails with
    /// `StoreError::Unavailable` while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.ensure_online()?;
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.ensure_online()?;
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

fn insert_keyed<E>(table: &mut BTreeMap<E::Id, E>, record: &E) -> InsertOutcome
where
    E: Entity + Clone,
{
    if table.contains_key(&record.id()) {
        return InsertOutcome::AlreadyExists;
    }
    table.insert(record.id(), record.clone());
    InsertOutcome::Inserted
}

fn sorted_sales<'a>(sales: impl Iterator<Item = &'a Sale>) -> Vec<Sale> {
    let mut out: Vec<Sale> = sales.cloned().collect();
    out.sort_by_key(|s| (s.timestamp, s.sale_id));
    out
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert_category(&self, category: &Category) -> StoreResult<InsertOutcome> {
        category.validate()?;
        let mut tables = self.write()?;
        Ok(insert_keyed(&mut tables.categories, category))
    }

    async fn insert_inventory_item(&self, item: &InventoryItem) -> StoreResult<InsertOutcome> {
        item.validate()?;
        let mut tables = self.write()?;
        if tables.inventory.contains_key(&item.inv_id) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        if !tables.categories.contains_key(&item.cat_id) {
            return Err(DomainError::invariant(format!(
                "inventory item {} references unknown category {}",
                item.inv_id, item.cat_id
            ))
            .into());
        }
        Ok(insert_keyed(&mut tables.inventory, item))
    }

    async fn insert_sale(&self, sale: &Sale) -> StoreResult<InsertOutcome> {
        sale.validate()?;
        let mut tables = self.write()?;
        if tables.sales.contains_key(&sale.sale_id) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        if !tables.inventory.contains_key(&sale.inv_id) {
            return Err(DomainError::invariant(format!(
                "sale {} references unknown inventory item {}",
                sale.sale_id, sale.inv_id
            ))
            .into());
        }
        Ok(insert_keyed(&mut tables.sales, sale))
    }

    async fn get_category(&self, cat_id: CategoryId) -> StoreResult<Option<Category>> {
        Ok(self.read()?.categories.get(&cat_id).cloned())
    }

    async fn get_inventory_item(&self, inv_id: InventoryId) -> StoreResult<Option<InventoryItem>> {
        Ok(self.read()?.inventory.get(&inv_id).cloned())
    }

    async fn inventory_by_category(&self, cat_id: CategoryId) -> StoreResult<Vec<InventoryItem>> {
        let tables = self.read()?;
        Ok(tables
            .inventory
            .values()
            .filter(|item| item.cat_id == cat_id)
            .cloned()
            .collect())
    }

    async fn get_sale(&self, sale_id: SaleId) -> StoreResult<Option<Sale>> {
        Ok(self.read()?.sales.get(&sale_id).cloned())
    }

    async fn sales_by_inventory(&self, inv_id: InventoryId) -> StoreResult<Vec<Sale>> {
        let tables = self.read()?;
        Ok(sorted_sales(
            tables.sales.values().filter(|s| s.inv_id == inv_id),
        ))
    }

    async fn sales_by_inventory_ids(&self, inv_ids: &[InventoryId]) -> StoreResult<Vec<Sale>> {
        let tables = self.read()?;
        Ok(sorted_sales(
            tables
                .sales
                .values()
                .filter(|s| inv_ids.contains(&s.inv_id)),
        ))
    }

    async fn sales_in_period(&self, period: &Period) -> StoreResult<Vec<Sale>> {
        let tables = self.read()?;
        Ok(sorted_sales(
            tables
                .sales
                .values()
                .filter(|s| period.contains(&s.timestamp)),
        ))
    }

    async fn apply_inventory_update(
        &self,
        inv_id: InventoryId,
        update: &InventoryUpdate,
        policy: ChangeHistoryPolicy,
        now: DateTime<Utc>,
    ) -> StoreResult<TrackedUpdate> {
        let mut guard = self.write()?;
        let tables = &mut *guard;

        let mut item = tables
            .inventory
            .get(&inv_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("inventory item {inv_id} not found")))?;

        if let Some(cat_id) = update.cat_id {
            if !tables.categories.contains_key(&cat_id) {
                return Err(DomainError::not_found(format!("category {cat_id} not found")).into());
            }
        }

        // Mutate a copy; nothing is written until every check has passed.
        item.apply_update(update)?;

        let latest = latest_change(tables.changes.values().filter(|c| c.inv_id == inv_id)).cloned();
        let change = match plan_change(policy, latest.as_ref(), inv_id, update, now) {
            None => None,
            Some(ChangeWrite::Insert(new)) => {
                tables.last_change_id += 1;
                let row = new.with_id(ChangeId::new(tables.last_change_id));
                tables.changes.insert(row.ch_id, row.clone());
                Some(row)
            }
            Some(ChangeWrite::Overwrite(row)) => {
                tables.changes.insert(row.ch_id, row.clone());
                Some(row)
            }
        };

        tables.inventory.insert(inv_id, item.clone());
        Ok(TrackedUpdate { item, change })
    }

    async fn inventory_changes(&self, inv_id: InventoryId) -> StoreResult<Vec<InventoryChange>> {
        let tables = self.read()?;
        let mut rows: Vec<InventoryChange> = tables
            .changes
            .values()
            .filter(|c| c.inv_id == inv_id)
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.ch_date, c.ch_id));
        Ok(rows)
    }
}
