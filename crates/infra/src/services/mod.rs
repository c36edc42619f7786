//! Application services composing domain rules with a record store.

pub mod change_tracker;
pub mod sales_query;

use thiserror::Error;

use backoffice_core::DomainError;

use crate::store::StoreError;

pub use change_tracker::{InventoryChangeTracker, InventoryStatusReport};
pub use sales_query::{RevenueReport, SalesQueryService};

/// Service-level error, the single taxonomy the HTTP layer maps to statuses.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    InvariantViolation(String),

    #[error("{0}")]
    ArithmeticFault(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("store error: {0}")]
    Store(String),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
            DomainError::NotFound(msg) => Self::NotFound(msg),
            DomainError::AlreadyExists(msg) => Self::AlreadyExists(msg),
            DomainError::InvariantViolation(msg) => Self::InvariantViolation(msg),
            DomainError::ArithmeticFault(msg) => Self::ArithmeticFault(msg),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
            StoreError::Corrupt(msg) | StoreError::Backend(msg) => Self::Store(msg),
            StoreError::Domain(e) => e.into(),
        }
    }
}
