//! Hall-of-fame membership (set-valued).
//!
//! One document per (user, account) that earned membership, with the
//! display name frozen at induction time. No TTL and no eviction;
//! membership changes only through explicit reconciliation when the
//! standings are recomputed.

use chrono::Utc;
use riftline_store::{Collection, CollectionSchema, IndexSpec, PostgresPool, reconcile};
use riftline_types::{HallOfFameKey, HallOfFameMember, UserId};

use crate::error::CacheError;

/// Schema of the `hall_of_fame_members` collection.
pub struct HallOfFame;

impl CollectionSchema for HallOfFame {
    const NAME: &'static str = "hall_of_fame_members";
    type Key = HallOfFameKey;
    type Value = HallOfFameMember;

    // Set-valued: no freshness index, membership is never swept.
    fn indexes() -> Vec<IndexSpec> {
        vec![IndexSpec::unique_key()]
    }
}

/// Maintains hall-of-fame membership by reconciliation.
pub struct HallOfFameService {
    collection: Collection<HallOfFame>,
}

impl HallOfFameService {
    /// Create the service on the given pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            collection: Collection::new(pool),
        }
    }

    /// Apply a desired delete-list and upsert-list as one batch.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Store`] if the batch itself fails.
    pub async fn apply(
        &self,
        to_delete: &[HallOfFameKey],
        to_upsert: &[(HallOfFameKey, HallOfFameMember)],
    ) -> Result<bool, CacheError> {
        Ok(reconcile(&self.collection, to_delete, to_upsert, Utc::now()).await?)
    }

    /// List the memberships of one user.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Store`] if the query or a decode fails.
    pub async fn members_for_user(
        &self,
        user: UserId,
    ) -> Result<Vec<(HallOfFameKey, HallOfFameMember)>, CacheError> {
        Ok(self
            .collection
            .find_many(&serde_json::json!({ "user": user }))
            .await?)
    }
}
