//! Live-game caches: the official spectator record plus two scraped
//! snapshots.
//!
//! The official record and the two scraper snapshots are cached in
//! three independent collections under the same [`GameKey`] because the
//! sources update on their own cadences and disagree mid-game; a page
//! render shows whichever subset is available.
//!
//! Force semantics differ: the official record is short-lived and a
//! forced lookup bypasses the read; the scrapers are expensive and
//! fragile, so a forced scrape is satisfied by *any* stored snapshot of
//! that game (epoch-pinned cutoff) -- once a game has been scraped, it
//! is never scraped again just because a viewer mashed refresh.

use chrono::{TimeDelta, Utc};
use riftline_store::{Collection, CollectionSchema, PostgresPool};
use riftline_types::{ActiveGame, GameKey, ScrapedGame};

use crate::error::CacheError;
use crate::fetch::Fetch;
use crate::policy::{ForceMode, ReadThrough, Refresh};

/// Default freshness window for official live-game records, in minutes.
pub const ACTIVE_GAME_TTL_MINUTES: i64 = 5;

/// Default freshness window for scraped snapshots, in minutes.
pub const SCRAPED_GAME_TTL_MINUTES: i64 = 10;

/// Schema of the `active_games` collection (official spectator API).
pub struct ActiveGames;

impl CollectionSchema for ActiveGames {
    const NAME: &'static str = "active_games";
    type Key = GameKey;
    type Value = ActiveGame;
}

/// Schema of the `tracker_games` collection (first scraped source).
pub struct TrackerGames;

impl CollectionSchema for TrackerGames {
    const NAME: &'static str = "tracker_games";
    type Key = GameKey;
    type Value = ScrapedGame;
}

/// Schema of the `spectate_games` collection (second scraped source).
pub struct SpectateGames;

impl CollectionSchema for SpectateGames {
    const NAME: &'static str = "spectate_games";
    type Key = GameKey;
    type Value = ScrapedGame;
}

/// Read-through cache of official live-game records.
pub struct LiveGameService<F> {
    collection: Collection<ActiveGames>,
    fetcher: F,
    policy: ReadThrough,
}

impl<F> LiveGameService<F>
where
    F: Fetch<GameKey, ActiveGame>,
{
    /// Create the service with the default freshness window.
    pub fn new(pool: &PostgresPool, fetcher: F) -> Self {
        Self::with_ttl(pool, fetcher, TimeDelta::minutes(ACTIVE_GAME_TTL_MINUTES))
    }

    /// Create the service with an explicit freshness window.
    pub fn with_ttl(pool: &PostgresPool, fetcher: F, ttl: TimeDelta) -> Self {
        Self {
            collection: Collection::new(pool),
            fetcher,
            policy: ReadThrough::new(ttl, ForceMode::BypassRead),
        }
    }

    /// Look up the official record of one live game.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the store or the upstream fails; a
    /// game that already ended is `Ok(None)` and never cached.
    pub async fn get(
        &self,
        key: &GameKey,
        refresh: Refresh,
    ) -> Result<Option<ActiveGame>, CacheError> {
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

/// Read-through cache of one scraped live-game source.
///
/// Generic over the snapshot collection so both scraped sources share
/// one implementation while remaining independent on disk:
/// `SnapshotService<TrackerGames, _>` and
/// `SnapshotService<SpectateGames, _>`.
pub struct SnapshotService<S: CollectionSchema, F> {
    collection: Collection<S>,
    fetcher: F,
    policy: ReadThrough,
}

impl<S, F> SnapshotService<S, F>
where
    S: CollectionSchema<Key = GameKey, Value = ScrapedGame>,
    F: Fetch<GameKey, ScrapedGame>,
{
    /// Create the service with the default freshness window.
    pub fn new(pool: &PostgresPool, fetcher: F) -> Self {
        Self::with_ttl(pool, fetcher, TimeDelta::minutes(SCRAPED_GAME_TTL_MINUTES))
    }

    /// Create the service with an explicit freshness window.
    pub fn with_ttl(pool: &PostgresPool, fetcher: F, ttl: TimeDelta) -> Self {
        Self {
            collection: Collection::new(pool),
            fetcher,
            policy: ReadThrough::new(ttl, ForceMode::PinEpoch),
        }
    }

    /// Look up this source's snapshot of one live game.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the store or the scrape fails; a game
    /// the source does not know is `Ok(None)` and never cached.
    pub async fn get(
        &self,
        key: &GameKey,
        refresh: Refresh,
    ) -> Result<Option<ScrapedGame>, CacheError> {
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
