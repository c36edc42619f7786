//! Inventory domain module.
//!
//! This crate contains the business rules for categories, inventory items and
//! the inventory change history, implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage). Stores call into it to decide what to
//! write; they never re-implement the rules.

pub mod category;
pub mod change;
pub mod item;

pub use category::Category;
pub use change::{
    latest_change, plan_change, ChangeHistoryPolicy, ChangeWrite, InventoryChange,
    NewInventoryChange, TrackedUpdate,
};
pub use item::{InventoryItem, InventoryStatus, InventoryUpdate};
