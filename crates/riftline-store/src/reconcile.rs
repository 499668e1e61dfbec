//! Set synchronization for multi-valued collections.
//!
//! Collections like per-user champion-shard counts and hall-of-fame
//! membership hold one document per set member. Callers compute a
//! desired delete-list and upsert-list; [`reconcile`] applies both as
//! one batch and reports success as an upper-bound sanity check on the
//! resulting counts, not an exact-count assertion -- concurrent writers
//! may race harmlessly on the same keys.

use chrono::{DateTime, Utc};

use crate::collection::{Collection, WriteCounts};
use crate::error::StoreError;
use crate::schema::CollectionSchema;

/// Apply a delete-list and an upsert-list to a set-valued collection.
///
/// Both lists empty is a trivial success with no store round-trip.
/// Otherwise the two lists are submitted as one batch (a single
/// delete-many plus one upsert per entry). The returned boolean is
/// `deleted <= |to_delete| && modified + upserted <= |to_upsert|`;
/// counts outside those bounds are reported as `false` and logged at
/// `warn`, never raised, because partial multi-document writes are
/// tolerated as eventually consistent.
///
/// # Errors
///
/// Returns [`StoreError`] if the underlying batch itself fails.
pub async fn reconcile<S: CollectionSchema>(
    collection: &Collection<S>,
    to_delete: &[S::Key],
    to_upsert: &[(S::Key, S::Value)],
    inserted_at: DateTime<Utc>,
) -> Result<bool, StoreError> {
    if to_delete.is_empty() && to_upsert.is_empty() {
        return Ok(true);
    }

    let counts = collection
        .bulk_write(to_delete, to_upsert, inserted_at)
        .await?;

    let ok = counts_within_bounds(counts, to_delete.len(), to_upsert.len());
    if !ok {
        tracing::warn!(
            collection = collection.name(),
            deletes_requested = to_delete.len(),
            upserts_requested = to_upsert.len(),
            deleted = counts.deleted,
            modified = counts.modified,
            upserted = counts.upserted,
            "Reconciliation counts out of bounds"
        );
    }
    Ok(ok)
}

/// Upper-bound sanity check on batch counts.
fn counts_within_bounds(counts: WriteCounts, max_deletes: usize, max_upserts: usize) -> bool {
    let max_deletes = u64::try_from(max_deletes).unwrap_or(u64::MAX);
    let max_upserts = u64::try_from(max_upserts).unwrap_or(u64::MAX);
    counts.deleted <= max_deletes
        && counts.modified.saturating_add(counts.upserted) <= max_upserts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_counts_are_within_bounds() {
        let counts = WriteCounts {
            deleted: 2,
            modified: 1,
            upserted: 1,
        };
        assert!(counts_within_bounds(counts, 2, 2));
    }

    #[test]
    fn fewer_than_requested_is_tolerated() {
        // A concurrent writer may have deleted a key first, or an upsert
        // may have been a pure no-op; both undershoot the request size.
        let counts = WriteCounts {
            deleted: 0,
            modified: 1,
            upserted: 0,
        };
        assert!(counts_within_bounds(counts, 3, 4));
    }

    #[test]
    fn overshooting_deletes_fails_the_check() {
        let counts = WriteCounts {
            deleted: 3,
            modified: 0,
            upserted: 0,
        };
        assert!(!counts_within_bounds(counts, 2, 0));
    }

    #[test]
    fn overshooting_upserts_fails_the_check() {
        let counts = WriteCounts {
            deleted: 0,
            modified: 2,
            upserted: 1,
        };
        assert!(!counts_within_bounds(counts, 0, 2));
    }
}
