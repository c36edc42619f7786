//! Record store: persistence of categories, inventory, sales and change rows.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;
pub use r#trait::{InsertOutcome, RecordStore, SharedStore, StoreError, StoreResult};
