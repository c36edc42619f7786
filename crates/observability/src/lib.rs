//! Tracing and request correlation (shared setup).

/// Initialize process-wide tracing/logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Request correlation ids.
pub mod request_id;

/// Tracing configuration (filters, layers).
pub mod tracing;
