//! Per-user champion shard counts (set-valued).
//!
//! One document per (user, account, champion) holding an integer count.
//! No TTL and no eviction: membership changes only through explicit
//! reconciliation after the loot page is re-scraped -- the wiki and
//! loot scrapers produce a full desired set, and the service applies
//! the delta as one batch.

use chrono::Utc;
use riftline_store::{Collection, CollectionSchema, IndexSpec, PostgresPool, reconcile};
use riftline_types::{Puuid, ShardKey, UserId};

use crate::error::CacheError;

/// Schema of the `champion_shards` collection.
pub struct ChampionShards;

impl CollectionSchema for ChampionShards {
    const NAME: &'static str = "champion_shards";
    type Key = ShardKey;
    type Value = i32;

    // Set-valued: no freshness index, membership is never swept.
    fn indexes() -> Vec<IndexSpec> {
        vec![IndexSpec::unique_key()]
    }
}

/// Maintains per-user champion shard counts by reconciliation.
pub struct ShardService {
    collection: Collection<ChampionShards>,
}

impl ShardService {
    /// Create the service on the given pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            collection: Collection::new(pool),
        }
    }

    /// Apply a desired delete-list and upsert-list as one batch.
    ///
    /// Returns the reconciler's upper-bound success check; `false`
    /// means the counts looked off (logged upstream), not that the
    /// write failed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Store`] if the batch itself fails.
    pub async fn apply(
        &self,
        to_delete: &[ShardKey],
        to_upsert: &[(ShardKey, i32)],
    ) -> Result<bool, CacheError> {
        Ok(reconcile(&self.collection, to_delete, to_upsert, Utc::now()).await?)
    }

    /// List every shard count of one user, across all linked accounts.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Store`] if the query or a decode fails.
    pub async fn counts_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<(ShardKey, i32)>, CacheError> {
        Ok(self
            .collection
            .find_many(&serde_json::json!({ "user": user }))
            .await?)
    }

    /// List the shard counts of one linked account of one user.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Store`] if the query or a decode fails.
    pub async fn counts_for_account(
        &self,
        user: UserId,
        puuid: &Puuid,
    ) -> Result<Vec<(ShardKey, i32)>, CacheError> {
        Ok(self
            .collection
            .find_many(&serde_json::json!({ "user": user, "puuid": puuid }))
            .await?)
    }
}
