//! Summoner profile cache.
//!
//! Summoners are reachable by name (search box) and by encrypted id
//! (everything downstream of a league entry). The two lookup paths are
//! cached as independent documents under one unique index; see
//! [`SummonerKey`]. Force-refresh bypasses the store read entirely, so
//! a profile-page refresh always reflects the live upstream.

use chrono::{TimeDelta, Utc};
use riftline_store::{Collection, CollectionSchema, PostgresPool};
use riftline_types::{Platform, SummonerId, SummonerKey, SummonerProfile};

use crate::error::CacheError;
use crate::fetch::Fetch;
use crate::policy::{ForceMode, ReadThrough, Refresh};

/// Default freshness window for summoner profiles, in hours.
pub const SUMMONER_TTL_HOURS: i64 = 12;

/// Schema of the `summoners` collection.
pub struct Summoners;

impl CollectionSchema for Summoners {
    const NAME: &'static str = "summoners";
    type Key = SummonerKey;
    type Value = SummonerProfile;
}

/// Read-through cache of summoner profiles.
pub struct SummonerService<F> {
    collection: Collection<Summoners>,
    fetcher: F,
    policy: ReadThrough,
}

impl<F> SummonerService<F>
where
    F: Fetch<SummonerKey, SummonerProfile>,
{
    /// Create the service with the default freshness window.
    pub fn new(pool: &PostgresPool, fetcher: F) -> Self {
        Self::with_ttl(pool, fetcher, TimeDelta::hours(SUMMONER_TTL_HOURS))
    }

    /// Create the service with an explicit freshness window.
    pub fn with_ttl(pool: &PostgresPool, fetcher: F, ttl: TimeDelta) -> Self {
        Self {
            collection: Collection::new(pool),
            fetcher,
            policy: ReadThrough::new(ttl, ForceMode::BypassRead),
        }
    }

    /// Look up a summoner by either key shape.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the store or the upstream fails; a
    /// confirmed-absent summoner is `Ok(None)` and is never cached.
    pub async fn get(
        &self,
        key: &SummonerKey,
        refresh: Refresh,
    ) -> Result<Option<SummonerProfile>, CacheError> {
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

    /// Drop the cached records of one summoner, both key shapes.
    ///
    /// Called when the owning linked account is removed; the cascade
    /// must not leave an orphaned profile behind. Returns the number of
    /// documents removed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Store`] if a delete fails.
    pub async fn forget(
        &self,
        platform: Platform,
        summoner_id: &SummonerId,
        name: Option<&str>,
    ) -> Result<u64, CacheError> {
        let by_id = SummonerKey::Id {
            platform,
            summoner_id: summoner_id.clone(),
        };
        let mut removed = self.collection.delete_by_key(&by_id).await?;

        if let Some(name) = name {
            let by_name = SummonerKey::Name {
                platform,
                name: name.to_lowercase(),
            };
            removed = removed.saturating_add(self.collection.delete_by_key(&by_name).await?);
        }

        Ok(removed)
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
