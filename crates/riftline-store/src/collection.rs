//! Typed collection handle over one JSONB-backed table.
//!
//! Every collection is a table of `(key JSONB, payload JSONB,
//! inserted_at TIMESTAMPTZ)` with a unique index on `key`. Reads decode
//! the raw payload against the schema's value type; a mismatch is a
//! fatal [`StoreError::Decode`] for that call, never "not found".
//! Writes replace the payload wholesale and stamp the caller-supplied
//! `inserted_at`, which is the sole basis for freshness decisions and
//! is never recomputed on read.
//!
//! All operations emit `tracing` events with the collection name and a
//! size-capped dump of the touched key; tracing never blocks or fails
//! the operation.

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::StoreError;
use crate::postgres::PostgresPool;
use crate::schema::CollectionSchema;

/// Maximum number of bytes of a raw value reproduced in logs and
/// decode errors.
const DUMP_CAP: usize = 512;

/// Outcome counts of a write batch, mirroring the upstream document
/// store's bulk-write report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCounts {
    /// Documents removed by the delete phase.
    pub deleted: u64,
    /// Existing documents replaced in place.
    pub modified: u64,
    /// Documents newly inserted.
    pub upserted: u64,
}

impl WriteCounts {
    /// The single-upsert success heuristic: `modified + upserted <= 1`.
    ///
    /// This cannot distinguish "no-op because the value was unchanged"
    /// from "no-op because a concurrent writer won the race"; callers
    /// must not rely on it for anything beyond best-effort logging.
    pub const fn single_write_ok(&self) -> bool {
        self.modified.saturating_add(self.upserted) <= 1
    }
}

/// Typed handle to one collection.
///
/// Cheap to clone (wraps an [`sqlx::PgPool`]); the schema parameter is
/// a zero-sized marker.
pub struct Collection<S: CollectionSchema> {
    pool: PgPool,
    _schema: PhantomData<fn() -> S>,
}

impl<S: CollectionSchema> Clone for Collection<S> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _schema: PhantomData,
        }
    }
}

impl<S: CollectionSchema> Collection<S> {
    /// Create a collection handle on the given pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
            _schema: PhantomData,
        }
    }

    /// Return the collection's table name.
    pub const fn name(&self) -> &'static str {
        S::NAME
    }

    /// Create the backing table and indexes if they do not exist.
    ///
    /// Called once at boot for every registered schema, after the
    /// migration runner has completed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the DDL fails.
    pub async fn ensure(&self) -> Result<(), StoreError> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             key JSONB NOT NULL, \
             payload JSONB NOT NULL, \
             inserted_at TIMESTAMPTZ NOT NULL)",
            S::NAME
        );
        sqlx::query(&ddl).execute(&self.pool).await?;

        for index in S::indexes() {
            let unique = if index.unique { "UNIQUE " } else { "" };
            let ddl = format!(
                "CREATE {unique}INDEX IF NOT EXISTS {}_{} ON {} ({})",
                S::NAME,
                index.suffix,
                S::NAME,
                index.columns
            );
            sqlx::query(&ddl).execute(&self.pool).await?;
        }

        tracing::debug!(collection = S::NAME, "Collection ensured");
        Ok(())
    }

    /// Find the document with the given key, optionally requiring it to
    /// have been inserted at or after `inserted_after`.
    ///
    /// A record with `inserted_at` exactly equal to the bound matches.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] if a stored payload does not match
    /// the schema (never treated as "not found"), or
    /// [`StoreError::Postgres`] if the query fails.
    pub async fn find_one(
        &self,
        key: &S::Key,
        inserted_after: Option<DateTime<Utc>>,
    ) -> Result<Option<S::Value>, StoreError> {
        let key_json = encode::<S, _>(key)?;
        let sql = format!(
            "SELECT payload FROM {} \
             WHERE key = $1 AND ($2::timestamptz IS NULL OR inserted_at >= $2)",
            S::NAME
        );

        let row: Option<(serde_json::Value,)> = sqlx::query_as(&sql)
            .bind(&key_json)
            .bind(inserted_after)
            .fetch_optional(&self.pool)
            .await?;

        tracing::debug!(
            collection = S::NAME,
            op = "find_one",
            key = %capped_dump(&key_json),
            inserted_after = inserted_after.map(|t| t.to_rfc3339()),
            hit = row.is_some(),
            "Store read"
        );

        row.map(|(raw,)| decode::<S>(raw)).transpose()
    }

    /// List all documents whose key contains `key_filter` (JSONB
    /// containment), returning decoded key/payload pairs.
    ///
    /// Used by set-valued collections to enumerate membership, e.g. all
    /// shard counts of one user via `{"user": "..."}`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] if any stored key or payload does
    /// not match the schema, or [`StoreError::Postgres`] on query
    /// failure.
    pub async fn find_many(
        &self,
        key_filter: &serde_json::Value,
    ) -> Result<Vec<(S::Key, S::Value)>, StoreError> {
        let sql = format!("SELECT key, payload FROM {} WHERE key @> $1", S::NAME);

        let rows: Vec<(serde_json::Value, serde_json::Value)> = sqlx::query_as(&sql)
            .bind(key_filter)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            collection = S::NAME,
            op = "find_many",
            filter = %capped_dump(key_filter),
            count = rows.len(),
            "Store read"
        );

        rows.into_iter()
            .map(|(raw_key, raw_payload)| {
                Ok((decode_key::<S>(raw_key)?, decode::<S>(raw_payload)?))
            })
            .collect()
    }

    /// Insert or wholesale-replace the document with the given key.
    ///
    /// `inserted_at` is assigned by the writer at persist time and
    /// becomes the record's freshness timestamp. Returns the
    /// [`WriteCounts::single_write_ok`] heuristic.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if the key or value cannot be
    /// serialized, or [`StoreError::Postgres`] if the write fails.
    pub async fn upsert(
        &self,
        key: &S::Key,
        value: &S::Value,
        inserted_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let key_json = encode::<S, _>(key)?;
        let payload = encode::<S, _>(value)?;

        let counts = upsert_raw(&self.pool, S::NAME, &key_json, &payload, inserted_at).await?;

        tracing::debug!(
            collection = S::NAME,
            op = "upsert",
            key = %capped_dump(&key_json),
            payload = %capped_dump(&payload),
            modified = counts.modified,
            upserted = counts.upserted,
            "Store write"
        );

        Ok(counts.single_write_ok())
    }

    /// Delete the document with the given key, if present.
    ///
    /// Returns the number of documents removed (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if the key cannot be serialized,
    /// or [`StoreError::Postgres`] if the delete fails.
    pub async fn delete_by_key(&self, key: &S::Key) -> Result<u64, StoreError> {
        let key_json = encode::<S, _>(key)?;
        let sql = format!("DELETE FROM {} WHERE key = $1", S::NAME);

        let result = sqlx::query(&sql).bind(&key_json).execute(&self.pool).await?;

        tracing::debug!(
            collection = S::NAME,
            op = "delete_by_key",
            key = %capped_dump(&key_json),
            deleted = result.rows_affected(),
            "Store write"
        );

        Ok(result.rows_affected())
    }

    /// Delete every document with `inserted_at` strictly before
    /// `cutoff`. A record inserted exactly at the cutoff survives.
    ///
    /// This is the eviction-sweep primitive; it is never used against
    /// set-valued collections.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the delete fails.
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let sql = format!("DELETE FROM {} WHERE inserted_at < $1", S::NAME);

        let result = sqlx::query(&sql).bind(cutoff).execute(&self.pool).await?;

        tracing::debug!(
            collection = S::NAME,
            op = "delete_older_than",
            cutoff = %cutoff.to_rfc3339(),
            deleted = result.rows_affected(),
            "Store write"
        );

        Ok(result.rows_affected())
    }

    /// Apply one delete-list plus one upsert-list as a single batch.
    ///
    /// The delete phase is a single `DELETE ... WHERE key = ANY(...)`
    /// (skipped when the list is empty), followed by one upsert per
    /// entry. The batch runs in one transaction: the upstream document
    /// store submitted it as an unordered bulk request, and a
    /// transaction preserves its observable count contract while being
    /// strictly more atomic.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if any key or value cannot be
    /// serialized, or [`StoreError::Postgres`] if the batch fails.
    pub async fn bulk_write(
        &self,
        to_delete: &[S::Key],
        to_upsert: &[(S::Key, S::Value)],
        inserted_at: DateTime<Utc>,
    ) -> Result<WriteCounts, StoreError> {
        if to_delete.is_empty() && to_upsert.is_empty() {
            return Ok(WriteCounts::default());
        }

        let delete_keys: Vec<serde_json::Value> = to_delete
            .iter()
            .map(|key| encode::<S, _>(key))
            .collect::<Result<_, _>>()?;
        let upsert_docs: Vec<(serde_json::Value, serde_json::Value)> = to_upsert
            .iter()
            .map(|(key, value)| Ok((encode::<S, _>(key)?, encode::<S, _>(value)?)))
            .collect::<Result<_, StoreError>>()?;

        let mut counts = WriteCounts::default();
        let mut tx = self.pool.begin().await?;

        if !delete_keys.is_empty() {
            let sql = format!("DELETE FROM {} WHERE key = ANY($1)", S::NAME);
            let result = sqlx::query(&sql)
                .bind(&delete_keys)
                .execute(&mut *tx)
                .await?;
            counts.deleted = result.rows_affected();
        }

        for (key_json, payload) in &upsert_docs {
            let sql = format!(
                "INSERT INTO {} (key, payload, inserted_at) VALUES ($1, $2, $3) \
                 ON CONFLICT (key) DO UPDATE SET \
                 payload = EXCLUDED.payload, inserted_at = EXCLUDED.inserted_at \
                 RETURNING (xmax = 0) AS inserted",
                S::NAME
            );
            let (inserted,): (bool,) = sqlx::query_as(&sql)
                .bind(key_json)
                .bind(payload)
                .bind(inserted_at)
                .fetch_one(&mut *tx)
                .await?;
            if inserted {
                counts.upserted = counts.upserted.saturating_add(1);
            } else {
                counts.modified = counts.modified.saturating_add(1);
            }
        }

        tx.commit().await?;

        tracing::debug!(
            collection = S::NAME,
            op = "bulk_write",
            deletes_requested = to_delete.len(),
            upserts_requested = to_upsert.len(),
            deleted = counts.deleted,
            modified = counts.modified,
            upserted = counts.upserted,
            "Store write"
        );

        Ok(counts)
    }

    /// Count all documents in the collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Postgres`] if the query fails.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", S::NAME);
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

/// Insert-or-replace one document, classifying the write as an insert
/// or an in-place replacement via `xmax = 0`.
async fn upsert_raw(
    pool: &PgPool,
    table: &str,
    key_json: &serde_json::Value,
    payload: &serde_json::Value,
    inserted_at: DateTime<Utc>,
) -> Result<WriteCounts, StoreError> {
    let sql = format!(
        "INSERT INTO {table} (key, payload, inserted_at) VALUES ($1, $2, $3) \
         ON CONFLICT (key) DO UPDATE SET \
         payload = EXCLUDED.payload, inserted_at = EXCLUDED.inserted_at \
         RETURNING (xmax = 0) AS inserted"
    );

    let (inserted,): (bool,) = sqlx::query_as(&sql)
        .bind(key_json)
        .bind(payload)
        .bind(inserted_at)
        .fetch_one(pool)
        .await?;

    Ok(WriteCounts {
        deleted: 0,
        modified: u64::from(!inserted),
        upserted: u64::from(inserted),
    })
}

/// Serialize a key or payload to its canonical JSONB form.
fn encode<S: CollectionSchema, T: serde::Serialize>(
    value: &T,
) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|source| StoreError::Encode {
        collection: S::NAME,
        source,
    })
}

/// Decode a raw payload against the collection's value schema.
fn decode<S: CollectionSchema>(raw: serde_json::Value) -> Result<S::Value, StoreError> {
    let dump = capped_dump(&raw);
    serde_json::from_value(raw).map_err(|source| StoreError::Decode {
        collection: S::NAME,
        source,
        raw: dump,
    })
}

/// Decode a raw key against the collection's key schema.
fn decode_key<S: CollectionSchema>(raw: serde_json::Value) -> Result<S::Key, StoreError> {
    let dump = capped_dump(&raw);
    serde_json::from_value(raw).map_err(|source| StoreError::Decode {
        collection: S::NAME,
        source,
        raw: dump,
    })
}

/// Render a JSON value capped at [`DUMP_CAP`] bytes, cutting on a char
/// boundary.
fn capped_dump(value: &serde_json::Value) -> String {
    let mut rendered = value.to_string();
    if rendered.len() > DUMP_CAP {
        let mut cap = DUMP_CAP;
        while cap > 0 && !rendered.is_char_boundary(cap) {
            cap = cap.saturating_sub(1);
        }
        rendered.truncate(cap);
        rendered.push_str("...");
    }
    rendered
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn single_write_heuristic_accepts_at_most_one() {
        let insert = WriteCounts {
            deleted: 0,
            modified: 0,
            upserted: 1,
        };
        let replace = WriteCounts {
            deleted: 0,
            modified: 1,
            upserted: 0,
        };
        let noop = WriteCounts::default();
        let double = WriteCounts {
            deleted: 0,
            modified: 1,
            upserted: 1,
        };

        assert!(insert.single_write_ok());
        assert!(replace.single_write_ok());
        // A no-op also passes: the heuristic is documented as unable to
        // tell "nothing to do" from "lost a race".
        assert!(noop.single_write_ok());
        assert!(!double.single_write_ok());
    }

    #[test]
    fn capped_dump_passes_short_values_through() {
        let value = serde_json::json!({"a": 1});
        assert_eq!(capped_dump(&value), "{\"a\":1}");
    }

    #[test]
    fn capped_dump_truncates_long_values() {
        let long = "x".repeat(2 * DUMP_CAP);
        let value = serde_json::Value::String(long);
        let dump = capped_dump(&value);
        assert!(dump.len() <= DUMP_CAP.saturating_add(3));
        assert!(dump.ends_with("..."));
    }

    #[test]
    fn capped_dump_respects_char_boundaries() {
        // Multi-byte characters straddling the cap must not split.
        let long = "\u{00e9}".repeat(DUMP_CAP);
        let value = serde_json::Value::String(long);
        let dump = capped_dump(&value);
        assert!(dump.ends_with("..."));
        // Walking the string proves every char is intact.
        assert!(dump.chars().count() > 0);
    }
}
