//! The upstream-source capability.
//!
//! Fetchers wrap the rate-limited official API client, the page
//! scrapers, and the wiki client -- all out of scope for this crate.
//! The contract that matters here: `Ok(None)` strictly means the
//! upstream *confirmed* the entity is absent (the HTTP 404 class), and
//! every other failure mode (timeout, malformed response, exhausted
//! rate budget) is an `Err`, so the read-through policy never conflates
//! absence with error. Timeouts are the fetcher's responsibility; the
//! caching layer does not enforce any.

use core::future::Future;

/// Errors an upstream fetch can fail with.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The upstream replied with a non-success status other than
    /// confirmed absence.
    #[error("upstream returned status {status}: {message}")]
    Upstream {
        /// HTTP-ish status code.
        status: u16,
        /// Upstream-provided detail.
        message: String,
    },

    /// The local rate budget for the source is exhausted.
    #[error("rate budget exhausted for {source_name}")]
    RateLimited {
        /// Which upstream source ran out of budget.
        source_name: String,
    },

    /// The upstream responded but the payload could not be understood.
    #[error("malformed upstream response: {message}")]
    Malformed {
        /// What failed to parse.
        message: String,
    },

    /// The upstream could not be reached at all.
    #[error("upstream unreachable: {message}")]
    Unreachable {
        /// Transport-level detail.
        message: String,
    },
}

/// Capability to fetch one entity type from its upstream source.
///
/// Implementations live outside this crate (HTTP clients, scrapers);
/// tests substitute scripted fakes.
pub trait Fetch<K, V> {
    /// Fetch the entity for `key`.
    ///
    /// Returns `Ok(None)` only for confirmed absence upstream. Any
    /// other failure must be an `Err` -- never `Ok(None)`.
    fn fetch(&self, key: &K) -> impl Future<Output = Result<Option<V>, FetchError>> + Send;
}
