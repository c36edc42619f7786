//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, missing records, arithmetic faults). Infrastructure concerns
/// such as an unreachable store belong to the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. missing or incompatible parameters).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated (e.g. a dangling reference).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record was absent, or a lookup where absence is meaningful
    /// produced no rows.
    #[error("not found: {0}")]
    NotFound(String),

    /// A record with the same primary key is already present.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A computation had no defined result (zero baseline, overflow).
    #[error("arithmetic fault: {0}")]
    ArithmeticFault(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn arithmetic(msg: impl Into<String>) -> Self {
        Self::ArithmeticFault(msg.into())
    }
}
