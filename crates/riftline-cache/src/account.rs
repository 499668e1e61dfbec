//! Linked account cache.
//!
//! Account records (PUUID, game name, tag line) almost never change, so
//! the window is a week and force-refresh *pins the cutoff to epoch
//! zero*: a forced call is satisfied by any stored record regardless of
//! age, and only hits the source when nothing is stored at all. The
//! account-linking flow relies on this -- it forces a lookup for every
//! candidate and must not burn rate budget on accounts it has already
//! seen, at the cost of also skipping a would-be confirmed-absent
//! answer from upstream.

use chrono::{TimeDelta, Utc};
use riftline_store::{Collection, CollectionSchema, PostgresPool};
use riftline_types::{AccountKey, Puuid, RiotAccount};

use crate::error::CacheError;
use crate::fetch::Fetch;
use crate::policy::{ForceMode, ReadThrough, Refresh};

/// Default freshness window for account records, in days.
pub const ACCOUNT_TTL_DAYS: i64 = 7;

/// Schema of the `riot_accounts` collection.
pub struct Accounts;

impl CollectionSchema for Accounts {
    const NAME: &'static str = "riot_accounts";
    type Key = AccountKey;
    type Value = RiotAccount;
}

/// Read-through cache of linked account records.
pub struct AccountService<F> {
    collection: Collection<Accounts>,
    fetcher: F,
    policy: ReadThrough,
}

impl<F> AccountService<F>
where
    F: Fetch<AccountKey, RiotAccount>,
{
    /// Create the service with the default freshness window.
    pub fn new(pool: &PostgresPool, fetcher: F) -> Self {
        Self::with_ttl(pool, fetcher, TimeDelta::days(ACCOUNT_TTL_DAYS))
    }

    /// Create the service with an explicit freshness window.
    pub fn with_ttl(pool: &PostgresPool, fetcher: F, ttl: TimeDelta) -> Self {
        Self {
            collection: Collection::new(pool),
            fetcher,
            policy: ReadThrough::new(ttl, ForceMode::PinEpoch),
        }
    }

    /// Look up an account by either key shape.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the store or the upstream fails.
    pub async fn get(
        &self,
        key: &AccountKey,
        refresh: Refresh,
    ) -> Result<Option<RiotAccount>, CacheError> {
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

    /// Drop the cached records of one account, both key shapes.
    ///
    /// Called when a user unlinks the account. The caller passes the
    /// last-known game name and tag so the riot-id-shaped document goes
    /// too. Returns the number of documents removed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Store`] if a delete fails.
    pub async fn forget(
        &self,
        puuid: &Puuid,
        riot_id: Option<(&str, &str)>,
    ) -> Result<u64, CacheError> {
        let by_puuid = AccountKey::Puuid {
            puuid: puuid.clone(),
        };
        let mut removed = self.collection.delete_by_key(&by_puuid).await?;

        if let Some((game_name, tag_line)) = riot_id {
            let by_riot_id = AccountKey::RiotId {
                game_name: game_name.to_owned(),
                tag_line: tag_line.to_owned(),
            };
            removed = removed.saturating_add(self.collection.delete_by_key(&by_riot_id).await?);
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
