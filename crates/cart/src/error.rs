//! Error types for the cart engine.
//!
//! Expected failures (promo application) are returned as `Result` values.
//! Failures at the persistence boundary are absorbed inside
//! [`PersistentStore`](crate::persist::PersistentStore) and logged - the
//! in-memory cart stays authoritative for the current session no matter what
//! the storage layer does.

use thiserror::Error;

/// Failures surfaced to callers of `apply_promo`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PromoError {
    /// The code is not in the promo catalog.
    #[error("unknown promo code: {0}")]
    UnknownCode(String),

    /// The same code (case-insensitive) is already active.
    #[error("promo code {0} is already applied")]
    AlreadyApplied(String),
}

/// Failures raised by storage backends.
///
/// These never cross the [`PersistentStore`](crate::persist::PersistentStore)
/// boundary: reads fall back to the empty state, writes are logged and
/// dropped (persistence is best-effort).
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed (file backend).
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored form could not be serialized or deserialized.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend refused the operation (e.g. quota exceeded).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
