//! The generic read-through algorithm.
//!
//! One [`ReadThrough`] value is instantiated per domain entity and
//! drives every cached lookup: compute a freshness cutoff, try the
//! store, on miss fetch from the source and persist the result before
//! returning it.
//!
//! Two deliberately different force-refresh behaviors exist across
//! entities and are preserved per entity via [`ForceMode`]; they are
//! observably different whenever the store still holds a usable record.
//!
//! No negative caching: a source that confirms absence leaves the store
//! untouched, and the next lookup queries the source again.

use chrono::{DateTime, TimeDelta, Utc};

use riftline_store::StoreError;

use crate::error::CacheError;
use crate::fetch::FetchError;

/// Freshness selector for a single cached read.
///
/// Force-refresh and a pinned freshness boundary were mutually
/// exclusive flags at the call sites this replaces; the enum makes the
/// exclusion structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// Use the entity's default freshness window (`now - ttl`).
    Ttl,
    /// Pin the freshness boundary to an explicit instant, e.g. to
    /// intentionally accept stale-but-bounded data.
    InsertedAfter(DateTime<Utc>),
    /// Force a refresh, with per-entity semantics ([`ForceMode`]).
    Force,
}

/// What "force refresh" means for a given entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceMode {
    /// Skip the store lookup entirely and always hit the source.
    BypassRead,
    /// Run the store lookup with an epoch-zero cutoff that matches any
    /// stored record regardless of age. This also disables the
    /// confirmed-absent short-circuit a fresh fetch could have
    /// produced.
    PinEpoch,
}

/// Read-through policy for one entity: default TTL plus the entity's
/// force-refresh semantics.
#[derive(Debug, Clone, Copy)]
pub struct ReadThrough {
    ttl: TimeDelta,
    force_mode: ForceMode,
}

impl ReadThrough {
    /// Create a policy with the given freshness window and force
    /// semantics.
    pub const fn new(ttl: TimeDelta, force_mode: ForceMode) -> Self {
        Self { ttl, force_mode }
    }

    /// Return the configured freshness window.
    pub const fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Compute the store-lookup cutoff for one call, or `None` when the
    /// store lookup must be skipped entirely.
    fn cutoff(&self, now: DateTime<Utc>, refresh: Refresh) -> Option<DateTime<Utc>> {
        match refresh {
            Refresh::Ttl => Some(now.checked_sub_signed(self.ttl).unwrap_or(DateTime::UNIX_EPOCH)),
            Refresh::InsertedAfter(bound) => Some(bound),
            Refresh::Force => match self.force_mode {
                ForceMode::BypassRead => None,
                ForceMode::PinEpoch => Some(DateTime::UNIX_EPOCH),
            },
        }
    }

    /// Execute one read-through lookup.
    ///
    /// `from_store` receives the computed cutoff and returns the cached
    /// value if one is fresh enough; `from_source` queries the upstream
    /// (`Ok(None)` = confirmed absent); `to_store` persists a fetched
    /// value and reports the best-effort upsert heuristic, which is
    /// logged but never acted on.
    ///
    /// On a source-confirmed absence nothing is persisted -- no
    /// tombstone, no negative caching -- and `Ok(None)` is returned.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Store`] if the store read or write fails
    /// (a decode mismatch is an error, not a miss), and
    /// [`CacheError::Source`] if the fetch fails; in both cases the
    /// store is left untouched and no stale value is substituted.
    pub async fn run<V, FSt, FStFut, FSo, FSoFut, TSt, TStFut>(
        &self,
        now: DateTime<Utc>,
        refresh: Refresh,
        from_store: FSt,
        from_source: FSo,
        to_store: TSt,
    ) -> Result<Option<V>, CacheError>
    where
        V: Clone,
        FSt: FnOnce(DateTime<Utc>) -> FStFut,
        FStFut: Future<Output = Result<Option<V>, StoreError>>,
        FSo: FnOnce() -> FSoFut,
        FSoFut: Future<Output = Result<Option<V>, FetchError>>,
        TSt: FnOnce(V) -> TStFut,
        TStFut: Future<Output = Result<bool, StoreError>>,
    {
        if let Some(cutoff) = self.cutoff(now, refresh) {
            if let Some(cached) = from_store(cutoff).await? {
                return Ok(Some(cached));
            }
        }

        match from_source().await? {
            Some(value) => {
                let write_ok = to_store(value.clone()).await?;
                if !write_ok {
                    // Best-effort heuristic only: a lost race and a no-op
                    // write are indistinguishable here.
                    tracing::debug!("Upsert heuristic reported more than one write");
                }
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn policy(force_mode: ForceMode) -> ReadThrough {
        ReadThrough::new(TimeDelta::hours(1), force_mode)
    }

    fn now() -> DateTime<Utc> {
        "2026-08-07T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn ttl_cutoff_is_now_minus_window() {
        let cutoff = policy(ForceMode::BypassRead).cutoff(now(), Refresh::Ttl);
        assert_eq!(cutoff, Some("2026-08-07T11:00:00Z".parse().unwrap()));
    }

    #[test]
    fn pinned_cutoff_is_passed_through() {
        let bound: DateTime<Utc> = "2026-08-01T00:00:00Z".parse().unwrap();
        let cutoff = policy(ForceMode::BypassRead).cutoff(now(), Refresh::InsertedAfter(bound));
        assert_eq!(cutoff, Some(bound));
    }

    #[test]
    fn force_bypass_skips_the_store_lookup() {
        assert_eq!(policy(ForceMode::BypassRead).cutoff(now(), Refresh::Force), None);
    }

    #[test]
    fn force_pin_epoch_matches_any_record() {
        assert_eq!(
            policy(ForceMode::PinEpoch).cutoff(now(), Refresh::Force),
            Some(DateTime::UNIX_EPOCH)
        );
    }

    #[tokio::test]
    async fn fresh_hit_never_reaches_the_source() {
        let fetches = AtomicU32::new(0);

        let result = policy(ForceMode::BypassRead)
            .run(
                now(),
                Refresh::Ttl,
                |_cutoff| async { Ok(Some("cached".to_owned())) },
                || async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok(Some("fetched".to_owned()))
                },
                |_value| async { Ok(true) },
            )
            .await
            .unwrap();

        assert_eq!(result.as_deref(), Some("cached"));
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn miss_fetches_and_persists_before_returning() {
        let writes = AtomicU32::new(0);

        let result = policy(ForceMode::BypassRead)
            .run(
                now(),
                Refresh::Ttl,
                |_cutoff| async { Ok(None) },
                || async { Ok(Some("fetched".to_owned())) },
                |value: String| {
                    let writes = &writes;
                    async move {
                        assert_eq!(value, "fetched");
                        writes.fetch_add(1, Ordering::SeqCst);
                        Ok(true)
                    }
                },
            )
            .await
            .unwrap();

        assert_eq!(result.as_deref(), Some("fetched"));
        assert_eq!(writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn force_bypass_fetches_despite_a_fresh_record() {
        let fetches = AtomicU32::new(0);

        let result = policy(ForceMode::BypassRead)
            .run(
                now(),
                Refresh::Force,
                |_cutoff| async {
                    // Would be a fresh hit, but bypass never asks.
                    Ok(Some("cached".to_owned()))
                },
                || async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok(Some("fetched".to_owned()))
                },
                |_value| async { Ok(true) },
            )
            .await
            .unwrap();

        assert_eq!(result.as_deref(), Some("fetched"));
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn force_pin_epoch_returns_an_arbitrarily_stale_record() {
        let fetches = AtomicU32::new(0);

        let result = policy(ForceMode::PinEpoch)
            .run(
                now(),
                Refresh::Force,
                |cutoff| async move {
                    assert_eq!(cutoff, DateTime::UNIX_EPOCH);
                    Ok(Some("ancient".to_owned()))
                },
                || async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok(Some("fetched".to_owned()))
                },
                |_value| async { Ok(true) },
            )
            .await
            .unwrap();

        assert_eq!(result.as_deref(), Some("ancient"));
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn confirmed_absence_is_returned_without_persisting() {
        let writes = AtomicU32::new(0);

        let result = policy(ForceMode::BypassRead)
            .run(
                now(),
                Refresh::Ttl,
                |_cutoff| async { Ok(None::<String>) },
                || async { Ok(None) },
                |_value| async {
                    writes.fetch_add(1, Ordering::SeqCst);
                    Ok(true)
                },
            )
            .await
            .unwrap();

        assert!(result.is_none());
        assert_eq!(writes.load(Ordering::SeqCst), 0, "no negative caching");
    }

    #[tokio::test]
    async fn absence_is_not_cached_so_the_next_call_fetches_again() {
        let fetches = AtomicU32::new(0);
        let policy = policy(ForceMode::BypassRead);

        for _ in 0..2 {
            let result = policy
                .run(
                    now(),
                    Refresh::Ttl,
                    |_cutoff| async { Ok(None::<String>) },
                    || async {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        Ok(None)
                    },
                    |_value| async { Ok(true) },
                )
                .await
                .unwrap();
            assert!(result.is_none());
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn source_failure_propagates_and_skips_the_write() {
        let writes = AtomicU32::new(0);

        let result = policy(ForceMode::BypassRead)
            .run(
                now(),
                Refresh::Ttl,
                |_cutoff| async { Ok(None::<String>) },
                || async {
                    Err(FetchError::Unreachable {
                        message: "connection refused".to_owned(),
                    })
                },
                |_value| async {
                    writes.fetch_add(1, Ordering::SeqCst);
                    Ok(true)
                },
            )
            .await;

        assert!(matches!(result, Err(CacheError::Source(_))));
        assert_eq!(writes.load(Ordering::SeqCst), 0, "store left untouched");
    }

    #[tokio::test]
    async fn heuristic_write_failure_still_returns_the_value() {
        let result = policy(ForceMode::BypassRead)
            .run(
                now(),
                Refresh::Ttl,
                |_cutoff| async { Ok(None::<String>) },
                || async { Ok(Some("fetched".to_owned())) },
                |_value| async { Ok(false) },
            )
            .await
            .unwrap();

        assert_eq!(result.as_deref(), Some("fetched"));
    }
}
