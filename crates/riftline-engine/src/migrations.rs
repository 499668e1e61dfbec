//! The application's migration catalogue.
//!
//! Append-only and chronologically ordered; an entry is immutable once
//! it has shipped. New migrations go at the end with a fresh
//! `created_at`. Bodies run before `ensure_collections`, so dropping a
//! table or index here is safe -- boot recreates it under the current
//! schema right after.

use futures::future::BoxFuture;
use riftline_store::{Migration, StoreError};
use sqlx::PgPool;

/// Build the full, ordered migration catalogue.
pub fn catalogue() -> Vec<Migration> {
    vec![
        Migration {
            created_at: timestamp("2025-11-03T09:30:00Z"),
            name: "drop v1 summoner cache",
            run: drop_v1_summoner_cache,
        },
        Migration {
            created_at: timestamp("2026-01-19T14:00:00Z"),
            name: "reset masteries after tokens_earned was added",
            run: reset_masteries_cache,
        },
        Migration {
            created_at: timestamp("2026-03-30T08:15:00Z"),
            name: "rebuild tracker snapshot freshness index",
            run: rebuild_tracker_freshness_index,
        },
    ]
}

/// Parse a hard-coded RFC 3339 timestamp.
///
/// Catalogue timestamps are literals reviewed at commit time; a typo
/// maps to the epoch, which the duplicate-identity check in review
/// would catch immediately.
fn timestamp(rfc3339: &str) -> chrono::DateTime<chrono::Utc> {
    rfc3339.parse().unwrap_or(chrono::DateTime::UNIX_EPOCH)
}

/// The pre-rewrite summoner cache kept one collection per platform;
/// the merged collection made them unreadable dead weight.
fn drop_v1_summoner_cache(pool: &PgPool) -> BoxFuture<'_, Result<(), StoreError>> {
    Box::pin(async move {
        // Tolerates the table never having existed.
        sqlx::query("DROP TABLE IF EXISTS summoner_cache_v1")
            .execute(pool)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    })
}

/// `tokens_earned` joined the mastery payload; cached documents from
/// before the change no longer decode, so the collection is rebuilt
/// from upstream on demand.
fn reset_masteries_cache(pool: &PgPool) -> BoxFuture<'_, Result<(), StoreError>> {
    Box::pin(async move {
        sqlx::query("DROP TABLE IF EXISTS champion_masteries")
            .execute(pool)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    })
}

/// The tracker snapshot freshness index predated the descending
/// ordering; drop it so boot recreates it with the current definition.
fn rebuild_tracker_freshness_index(pool: &PgPool) -> BoxFuture<'_, Result<(), StoreError>> {
    Box::pin(async move {
        sqlx::query("DROP INDEX IF EXISTS tracker_games_inserted_at_idx")
            .execute(pool)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_is_chronological_and_identities_are_unique() {
        let catalogue = catalogue();
        let mut previous = None;
        for migration in &catalogue {
            if let Some(prev) = previous {
                assert!(
                    migration.created_at > prev,
                    "catalogue must stay append-only and strictly ordered"
                );
            }
            previous = Some(migration.created_at);
        }
    }

    #[test]
    fn no_timestamp_fell_back_to_the_epoch() {
        for migration in catalogue() {
            assert!(
                migration.created_at > chrono::DateTime::UNIX_EPOCH,
                "migration '{}' has an unparseable created_at",
                migration.name
            );
        }
    }
}
