//! `backoffice-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed record identifiers, the domain error model and the entity/value object
//! marker traits shared by the inventory and sales crates.

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, ChangeId, InventoryId, SaleId};
pub use value_object::ValueObject;
