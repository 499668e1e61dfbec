//! Collection registry, boot-time setup, and the scheduled eviction
//! sweep.
//!
//! Every TTL-bound collection is swept once per scheduler tick:
//! `delete_older_than(tick_time - ttl)`. Set-valued collections
//! (champion shards, hall-of-fame membership) are ensured at boot but
//! never swept -- their membership is maintained only by explicit
//! reconciliation.
//!
//! The sweep is fire-and-forget cleanup: a failing collection is logged
//! at `warn` and the sweep moves on, so one bad table cannot starve the
//! others of their eviction pass.

use chrono::{DateTime, TimeDelta, Utc};
use riftline_store::{Collection, CollectionSchema, PostgresPool, StoreError};

use crate::account::{ACCOUNT_TTL_DAYS, Accounts};
use crate::challenge::{CHALLENGE_TTL_HOURS, Challenges};
use crate::hall_of_fame::HallOfFame;
use crate::league::{LEAGUE_TTL_HOURS, Leagues};
use crate::live_game::{
    ACTIVE_GAME_TTL_MINUTES, ActiveGames, SCRAPED_GAME_TTL_MINUTES, SpectateGames, TrackerGames,
};
use crate::mastery::{MASTERY_TTL_HOURS, Masteries};
use crate::shards::ChampionShards;
use crate::summoner::{SUMMONER_TTL_HOURS, Summoners};

/// Retention windows for every TTL-bound collection.
///
/// The same windows drive both freshness decisions and the daily
/// eviction sweep; overrides come from the service configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// Summoner profiles.
    pub summoners: TimeDelta,
    /// Champion masteries.
    pub masteries: TimeDelta,
    /// League standings.
    pub leagues: TimeDelta,
    /// Challenge progress.
    pub challenges: TimeDelta,
    /// Linked account records.
    pub accounts: TimeDelta,
    /// Official live-game records.
    pub active_games: TimeDelta,
    /// Scraped live-game snapshots (both sources).
    pub scraped_games: TimeDelta,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            summoners: TimeDelta::hours(SUMMONER_TTL_HOURS),
            masteries: TimeDelta::hours(MASTERY_TTL_HOURS),
            leagues: TimeDelta::hours(LEAGUE_TTL_HOURS),
            challenges: TimeDelta::hours(CHALLENGE_TTL_HOURS),
            accounts: TimeDelta::days(ACCOUNT_TTL_DAYS),
            active_games: TimeDelta::minutes(ACTIVE_GAME_TTL_MINUTES),
            scraped_games: TimeDelta::minutes(SCRAPED_GAME_TTL_MINUTES),
        }
    }
}

/// Create every collection's table and indexes if missing.
///
/// Called once at boot, after the migration runner has completed and
/// before any service accepts work.
///
/// # Errors
///
/// Returns [`StoreError`] if any DDL fails; boot must not proceed with
/// a partially ensured schema.
pub async fn ensure_collections(pool: &PostgresPool) -> Result<(), StoreError> {
    Collection::<Summoners>::new(pool).ensure().await?;
    Collection::<Masteries>::new(pool).ensure().await?;
    Collection::<Leagues>::new(pool).ensure().await?;
    Collection::<Challenges>::new(pool).ensure().await?;
    Collection::<Accounts>::new(pool).ensure().await?;
    Collection::<ActiveGames>::new(pool).ensure().await?;
    Collection::<TrackerGames>::new(pool).ensure().await?;
    Collection::<SpectateGames>::new(pool).ensure().await?;
    Collection::<ChampionShards>::new(pool).ensure().await?;
    Collection::<HallOfFame>::new(pool).ensure().await?;
    tracing::info!("All collections ensured");
    Ok(())
}

/// Run one eviction pass over every TTL-bound collection.
///
/// `at` is the scheduler tick time; each collection's cutoff is
/// `at - ttl`. Returns the total number of records evicted. Per-
/// collection failures are logged and skipped, never propagated.
pub async fn sweep(pool: &PostgresPool, at: DateTime<Utc>, ttls: &CacheTtls) -> u64 {
    let mut total: u64 = 0;
    total = total.saturating_add(sweep_one::<Summoners>(pool, at, ttls.summoners).await);
    total = total.saturating_add(sweep_one::<Masteries>(pool, at, ttls.masteries).await);
    total = total.saturating_add(sweep_one::<Leagues>(pool, at, ttls.leagues).await);
    total = total.saturating_add(sweep_one::<Challenges>(pool, at, ttls.challenges).await);
    total = total.saturating_add(sweep_one::<Accounts>(pool, at, ttls.accounts).await);
    total = total.saturating_add(sweep_one::<ActiveGames>(pool, at, ttls.active_games).await);
    total = total.saturating_add(sweep_one::<TrackerGames>(pool, at, ttls.scraped_games).await);
    total = total.saturating_add(sweep_one::<SpectateGames>(pool, at, ttls.scraped_games).await);

    tracing::info!(evicted = total, at = %at.to_rfc3339(), "Eviction sweep complete");
    total
}

/// Sweep one collection, logging instead of propagating failures.
async fn sweep_one<S: CollectionSchema>(
    pool: &PostgresPool,
    at: DateTime<Utc>,
    ttl: TimeDelta,
) -> u64 {
    let cutoff = at.checked_sub_signed(ttl).unwrap_or(DateTime::UNIX_EPOCH);
    match Collection::<S>::new(pool).delete_older_than(cutoff).await {
        Ok(deleted) => {
            if deleted > 0 {
                tracing::info!(collection = S::NAME, deleted, "Evicted expired records");
            }
            deleted
        }
        Err(error) => {
            tracing::warn!(collection = S::NAME, %error, "Eviction sweep failed");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttls_match_the_entity_catalogue() {
        let ttls = CacheTtls::default();
        assert_eq!(ttls.summoners, TimeDelta::hours(12));
        assert_eq!(ttls.masteries, TimeDelta::hours(24));
        assert_eq!(ttls.leagues, TimeDelta::hours(6));
        assert_eq!(ttls.challenges, TimeDelta::hours(24));
        assert_eq!(ttls.accounts, TimeDelta::days(7));
        assert_eq!(ttls.active_games, TimeDelta::minutes(5));
        assert_eq!(ttls.scraped_games, TimeDelta::minutes(10));
    }
}
