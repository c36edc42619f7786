//! Inventory change history.
//!
//! Every stock/price update of an item is mirrored into a change row. How rows
//! accumulate is governed by [`ChangeHistoryPolicy`]:
//!
//! - `Rolling`: a single row per item. The first update inserts it; later
//!   updates overwrite the supplied fields and keep the row's id and original
//!   `ch_date`.
//! - `Append`: one row per update (a full audit trail).
//!
//! [`plan_change`] decides which write an update needs; stores execute that
//! write in the same transaction as the item update.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backoffice_core::{ChangeId, DomainError, Entity, InventoryId};

use crate::item::{InventoryItem, InventoryUpdate};

/// A persisted change row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryChange {
    pub ch_id: ChangeId,
    pub inv_id: InventoryId,
    pub ch_date: DateTime<Utc>,
    pub current_stock: Option<i64>,
    pub unit_price: Option<i64>,
}

impl Entity for InventoryChange {
    type Id = ChangeId;

    fn id(&self) -> ChangeId {
        self.ch_id
    }
}

/// A change row that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInventoryChange {
    pub inv_id: InventoryId,
    pub ch_date: DateTime<Utc>,
    pub current_stock: Option<i64>,
    pub unit_price: Option<i64>,
}

impl NewInventoryChange {
    pub fn with_id(self, ch_id: ChangeId) -> InventoryChange {
        InventoryChange {
            ch_id,
            inv_id: self.inv_id,
            ch_date: self.ch_date,
            current_stock: self.current_stock,
            unit_price: self.unit_price,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeHistoryPolicy {
    /// Single row per item, overwritten in place.
    #[default]
    Rolling,
    /// New row per update.
    Append,
}

impl ChangeHistoryPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeHistoryPolicy::Rolling => "rolling",
            ChangeHistoryPolicy::Append => "append",
        }
    }
}

impl core::fmt::Display for ChangeHistoryPolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeHistoryPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rolling" => Ok(Self::Rolling),
            "append" => Ok(Self::Append),
            other => Err(DomainError::validation(format!(
                "unknown change history policy '{other}' (expected rolling or append)"
            ))),
        }
    }
}

/// Write required on the change table for one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeWrite {
    Insert(NewInventoryChange),
    /// Replace the stored row with this value (same `ch_id` and `ch_date`).
    Overwrite(InventoryChange),
}

/// Outcome of a tracked inventory update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedUpdate {
    pub item: InventoryItem,
    /// `None` when the update touched no tracked field.
    pub change: Option<InventoryChange>,
}

/// Most recent change row: latest `ch_date`, ties broken by the higher id.
pub fn latest_change<'a, I>(changes: I) -> Option<&'a InventoryChange>
where
    I: IntoIterator<Item = &'a InventoryChange>,
{
    changes
        .into_iter()
        .max_by_key(|c| (c.ch_date, c.ch_id))
}

/// Decide the change-table write for `update` applied to `inv_id`.
///
/// `latest` must be the item's most recent change row (see [`latest_change`]).
/// Returns `None` when the update carries neither stock nor price.
pub fn plan_change(
    policy: ChangeHistoryPolicy,
    latest: Option<&InventoryChange>,
    inv_id: InventoryId,
    update: &InventoryUpdate,
    now: DateTime<Utc>,
) -> Option<ChangeWrite> {
    if !update.tracks_change() {
        return None;
    }

    match (policy, latest) {
        (ChangeHistoryPolicy::Rolling, Some(existing)) => {
            let mut row = existing.clone();
            if let Some(stock) = update.current_stock {
                row.current_stock = Some(stock);
            }
            if let Some(price) = update.unit_price {
                row.unit_price = Some(price);
            }
            Some(ChangeWrite::Overwrite(row))
        }
        _ => Some(ChangeWrite::Insert(NewInventoryChange {
            inv_id,
            ch_date: now,
            current_stock: update.current_stock,
            unit_price: update.unit_price,
        })),
    }
}
