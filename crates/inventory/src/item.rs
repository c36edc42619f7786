use serde::{Deserialize, Serialize};

use backoffice_core::{CategoryId, DomainError, DomainResult, Entity, InventoryId, ValueObject};

/// Inventory item: stock level and unit price of one product, in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub inv_id: InventoryId,
    pub cat_id: CategoryId,
    pub current_stock: i64,
    pub unit_price: i64,
    /// Free-form alert flag carried over from the export (threshold logic is
    /// owned upstream).
    pub low_stock_alert: String,
}

impl InventoryItem {
    pub fn validate(&self) -> DomainResult<()> {
        if self.current_stock < 0 {
            return Err(DomainError::validation(format!(
                "inventory {}: current_stock cannot be negative",
                self.inv_id
            )));
        }
        if self.unit_price < 0 {
            return Err(DomainError::validation(format!(
                "inventory {}: unit_price cannot be negative",
                self.inv_id
            )));
        }
        Ok(())
    }

    /// Apply a validated update in place.
    ///
    /// Stock and price are applied independently when both are supplied.
    /// Category existence is checked by the caller, which owns the store.
    pub fn apply_update(&mut self, update: &InventoryUpdate) -> DomainResult<()> {
        update.validate()?;

        if let Some(stock) = update.current_stock {
            self.current_stock = stock;
        }
        if let Some(price) = update.unit_price {
            self.unit_price = price;
        }
        if let Some(cat_id) = update.cat_id {
            self.cat_id = cat_id;
        }
        Ok(())
    }

    pub fn status(&self) -> InventoryStatus {
        InventoryStatus {
            inv_id: self.inv_id,
            current_stock: self.current_stock,
            low_stock_alert: self.low_stock_alert.clone(),
        }
    }
}

impl Entity for InventoryItem {
    type Id = InventoryId;

    fn id(&self) -> InventoryId {
        self.inv_id
    }
}

/// Requested mutation of an inventory item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryUpdate {
    #[serde(default)]
    pub current_stock: Option<i64>,
    #[serde(default)]
    pub unit_price: Option<i64>,
    /// Reassigns the item to another (existing) category.
    #[serde(default)]
    pub cat_id: Option<CategoryId>,
}

impl ValueObject for InventoryUpdate {}

impl InventoryUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        if self.current_stock.is_none() && self.unit_price.is_none() && self.cat_id.is_none() {
            return Err(DomainError::validation(
                "at least one of current_stock, unit_price or cat_id is required",
            ));
        }
        if matches!(self.current_stock, Some(v) if v < 0) {
            return Err(DomainError::validation("current_stock cannot be negative"));
        }
        if matches!(self.unit_price, Some(v) if v < 0) {
            return Err(DomainError::validation("unit_price cannot be negative"));
        }
        Ok(())
    }

    /// Whether the update touches a tracked field (stock or price).
    pub fn tracks_change(&self) -> bool {
        self.current_stock.is_some() || self.unit_price.is_some()
    }
}

/// Stock view of an item, as reported by the status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryStatus {
    pub inv_id: InventoryId,
    pub current_stock: i64,
    pub low_stock_alert: String,
}
