//! Challenge progress cache.
//!
//! Challenge totals move about as slowly as masteries. Force-refresh
//! bypasses the store read.

use chrono::{TimeDelta, Utc};
use riftline_store::{Collection, CollectionSchema, PostgresPool};
use riftline_types::{ChallengeProgress, Puuid};

use crate::error::CacheError;
use crate::fetch::Fetch;
use crate::policy::{ForceMode, ReadThrough, Refresh};

/// Default freshness window for challenge progress, in hours.
pub const CHALLENGE_TTL_HOURS: i64 = 24;

/// Schema of the `challenge_progress` collection.
pub struct Challenges;

impl CollectionSchema for Challenges {
    const NAME: &'static str = "challenge_progress";
    type Key = Puuid;
    type Value = ChallengeProgress;
}

/// Read-through cache of per-player challenge progress.
pub struct ChallengeService<F> {
    collection: Collection<Challenges>,
    fetcher: F,
    policy: ReadThrough,
}

impl<F> ChallengeService<F>
where
    F: Fetch<Puuid, ChallengeProgress>,
{
    /// Create the service with the default freshness window.
    pub fn new(pool: &PostgresPool, fetcher: F) -> Self {
        Self::with_ttl(pool, fetcher, TimeDelta::hours(CHALLENGE_TTL_HOURS))
    }

    /// Create the service with an explicit freshness window.
    pub fn with_ttl(pool: &PostgresPool, fetcher: F, ttl: TimeDelta) -> Self {
        Self {
            collection: Collection::new(pool),
            fetcher,
            policy: ReadThrough::new(ttl, ForceMode::BypassRead),
        }
    }

    /// Look up the challenge progress of one player.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the store or the upstream fails.
    pub async fn get(
        &self,
        puuid: &Puuid,
        refresh: Refresh,
    ) -> Result<Option<ChallengeProgress>, CacheError> {
        let now = Utc::now();
        self.policy
            .run(
                now,
                refresh,
                |cutoff| self.collection.find_one(puuid, Some(cutoff)),
                || self.fetcher.fetch(puuid),
                |value| async move { self.collection.upsert(puuid, &value, now).await },
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
