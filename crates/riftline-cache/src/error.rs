//! Error types for the caching layer.

use riftline_store::StoreError;

use crate::fetch::FetchError;

/// Errors that can occur during a cached read or a cache maintenance
/// operation.
///
/// Both variants fail the enclosing domain operation: a decode mismatch
/// or store failure is never treated as a cache miss, and a source
/// failure never falls back to stale data.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The store read or write failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The upstream fetch failed (distinct from confirmed absence,
    /// which is not an error).
    #[error("source error: {0}")]
    Source(#[from] FetchError),
}
