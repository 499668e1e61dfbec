//! League standings cache.
//!
//! Ranked standings change after every game, so the window is the
//! shortest of the official-API entities. Force-refresh bypasses the
//! store read.

use chrono::{TimeDelta, Utc};
use riftline_store::{Collection, CollectionSchema, PostgresPool};
use riftline_types::{LeagueEntries, LeagueKey};

use crate::error::CacheError;
use crate::fetch::Fetch;
use crate::policy::{ForceMode, ReadThrough, Refresh};

/// Default freshness window for league entries, in hours.
pub const LEAGUE_TTL_HOURS: i64 = 6;

/// Schema of the `league_entries` collection.
pub struct Leagues;

impl CollectionSchema for Leagues {
    const NAME: &'static str = "league_entries";
    type Key = LeagueKey;
    type Value = LeagueEntries;
}

/// Read-through cache of per-summoner ranked standings.
pub struct LeagueService<F> {
    collection: Collection<Leagues>,
    fetcher: F,
    policy: ReadThrough,
}

impl<F> LeagueService<F>
where
    F: Fetch<LeagueKey, LeagueEntries>,
{
    /// Create the service with the default freshness window.
    pub fn new(pool: &PostgresPool, fetcher: F) -> Self {
        Self::with_ttl(pool, fetcher, TimeDelta::hours(LEAGUE_TTL_HOURS))
    }

    /// Create the service with an explicit freshness window.
    pub fn with_ttl(pool: &PostgresPool, fetcher: F, ttl: TimeDelta) -> Self {
        Self {
            collection: Collection::new(pool),
            fetcher,
            policy: ReadThrough::new(ttl, ForceMode::BypassRead),
        }
    }

    /// Look up the ranked standings of one summoner.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the store or the upstream fails.
    pub async fn get(
        &self,
        key: &LeagueKey,
        refresh: Refresh,
    ) -> Result<Option<LeagueEntries>, CacheError> {
        let now = Utc::now();
        self.policy
            .run(
                now,
                refresh,
                |cutoff| self.collection.find_one(key, Some(cutoff)),
                || self.fetcher.fetch(key),
                |value| async move { self.collection.upsert(key, &value, now).await },
            )
            .await
    }

    /// Evict records older than `cutoff`; driven by the daily sweep.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Store`] if the delete fails.
    pub async fn evict_older_than(
        &self,
        cutoff: chrono::DateTime<Utc>,
    ) -> Result<u64, CacheError> {
        Ok(self.collection.delete_older_than(cutoff).await?)
    }
}
