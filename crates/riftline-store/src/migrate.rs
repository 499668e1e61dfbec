//! Append-only schema-evolution runner.
//!
//! Cached payloads must always decode under their collection's current
//! schema; shape changes therefore ship together with a migration that
//! repairs or clears the affected collection. The catalogue of
//! migrations is static, hand-maintained, and chronologically ordered
//! by `created_at`; entries are never edited once shipped.
//!
//! The runner records each applied `created_at` durably and guarantees
//! every migration body executes at most once, sequentially, in
//! ascending order. Any failure aborts the boot sequence: the
//! application must not start against a partially migrated schema.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use sqlx::PgPool;

use crate::error::StoreError;

/// Bookkeeping table holding applied migration timestamps.
const APPLIED_TABLE: &str = "applied_migrations";

/// One schema-evolution step.
///
/// `run` is a plain function pointer so the catalogue stays a static
/// list of values; bodies are written as non-capturing closures
/// returning a boxed future.
pub struct Migration {
    /// Authoring timestamp; the migration's identity and sort key.
    pub created_at: DateTime<Utc>,
    /// Human-readable name for logs and failure reports.
    pub name: &'static str,
    /// The migration body.
    pub run: for<'a> fn(&'a PgPool) -> BoxFuture<'a, Result<(), StoreError>>,
}

impl core::fmt::Debug for Migration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Migration")
            .field("created_at", &self.created_at)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Applies pending migrations from a static catalogue, exactly once
/// each, recorded in the `applied_migrations` table.
pub struct MigrationRunner<'a> {
    pool: &'a PgPool,
}

impl<'a> MigrationRunner<'a> {
    /// Create a runner bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Run every not-yet-applied migration from the catalogue, in
    /// ascending `created_at` order, sequentially.
    ///
    /// Returns the number of migration bodies executed. Running the
    /// same catalogue twice executes zero bodies the second time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Migration`] if any body fails; nothing
    /// after the failing entry is attempted and the failure must abort
    /// startup.
    pub async fn run_pending(&self, catalogue: &[Migration]) -> Result<usize, StoreError> {
        self.ensure_table().await?;

        let applied = self.load_applied().await?;
        let pending = pending_migrations(catalogue, &applied);

        if pending.is_empty() {
            tracing::info!(total = catalogue.len(), "No pending migrations");
            return Ok(0);
        }

        tracing::info!(
            pending = pending.len(),
            total = catalogue.len(),
            "Applying migrations"
        );

        // Strictly sequential: later migrations may assume earlier ones
        // completed.
        for migration in &pending {
            tracing::info!(
                migration = migration.name,
                created_at = %migration.created_at.to_rfc3339(),
                "Applying migration"
            );

            (migration.run)(self.pool)
                .await
                .map_err(|source| StoreError::Migration {
                    name: migration.name,
                    source: Box::new(source),
                })?;

            self.record_applied(migration.created_at).await?;

            tracing::info!(migration = migration.name, "Migration applied");
        }

        Ok(pending.len())
    }

    /// Create the bookkeeping table if it does not exist.
    async fn ensure_table(&self) -> Result<(), StoreError> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {APPLIED_TABLE} (\
             created_at TIMESTAMPTZ PRIMARY KEY, \
             applied_at TIMESTAMPTZ NOT NULL)"
        );
        sqlx::query(&ddl).execute(self.pool).await?;
        Ok(())
    }

    /// Load the set of already-applied migration timestamps.
    async fn load_applied(&self) -> Result<BTreeSet<DateTime<Utc>>, StoreError> {
        let sql = format!("SELECT created_at FROM {APPLIED_TABLE}");
        let rows: Vec<(DateTime<Utc>,)> = sqlx::query_as(&sql).fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(|(created_at,)| created_at).collect())
    }

    /// Durably record one applied migration.
    async fn record_applied(&self, created_at: DateTime<Utc>) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO {APPLIED_TABLE} (created_at, applied_at) VALUES ($1, $2) \
             ON CONFLICT (created_at) DO NOTHING"
        );
        sqlx::query(&sql)
            .bind(created_at)
            .bind(Utc::now())
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

/// Filter the catalogue to not-yet-applied entries, sorted ascending by
/// `created_at`.
fn pending_migrations<'m>(
    catalogue: &'m [Migration],
    applied: &BTreeSet<DateTime<Utc>>,
) -> Vec<&'m Migration> {
    let mut pending: Vec<&Migration> = catalogue
        .iter()
        .filter(|m| !applied.contains(&m.created_at))
        .collect();
    pending.sort_by_key(|m| m.created_at);
    pending
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn noop_body(_pool: &PgPool) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async { Ok(()) })
    }

    fn migration(name: &'static str, ts: &str) -> Migration {
        Migration {
            created_at: ts.parse().unwrap(),
            name,
            run: noop_body,
        }
    }

    #[test]
    fn pending_filters_out_applied_entries() {
        let catalogue = vec![
            migration("first", "2025-01-10T00:00:00Z"),
            migration("second", "2025-03-02T00:00:00Z"),
            migration("third", "2025-06-15T00:00:00Z"),
        ];
        let applied: BTreeSet<DateTime<Utc>> =
            [catalogue.first().unwrap().created_at].into_iter().collect();

        let pending = pending_migrations(&catalogue, &applied);
        let names: Vec<&str> = pending.iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["second", "third"]);
    }

    #[test]
    fn pending_sorts_ascending_regardless_of_catalogue_order() {
        // The catalogue is maintained chronologically by hand, but the
        // runner must not depend on that.
        let catalogue = vec![
            migration("newest", "2025-06-15T00:00:00Z"),
            migration("oldest", "2025-01-10T00:00:00Z"),
            migration("middle", "2025-03-02T00:00:00Z"),
        ];
        let applied = BTreeSet::new();

        let pending = pending_migrations(&catalogue, &applied);
        let names: Vec<&str> = pending.iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["oldest", "middle", "newest"]);
    }

    #[test]
    fn fully_applied_catalogue_yields_nothing() {
        let catalogue = vec![
            migration("first", "2025-01-10T00:00:00Z"),
            migration("second", "2025-03-02T00:00:00Z"),
        ];
        let applied: BTreeSet<DateTime<Utc>> =
            catalogue.iter().map(|m| m.created_at).collect();

        assert!(pending_migrations(&catalogue, &applied).is_empty());
    }
}
