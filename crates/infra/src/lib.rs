//! Infrastructure layer: record stores, configuration, services and ingestion.
//!
//! Domain crates decide; this crate persists and composes. Services are
//! generic over [`store::RecordStore`] so the same code runs against Postgres
//! in production and the in-memory store in tests.

pub mod config;
pub mod ingest;
pub mod services;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use services::ServiceError;
