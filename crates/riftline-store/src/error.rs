//! Error types for the store layer.
//!
//! All errors are propagated via [`StoreError`] which wraps the
//! underlying [`sqlx`] and [`serde_json`] errors with the collection
//! context needed to diagnose which cached shape went wrong.

/// Errors that can occur in the store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A stored document does not match the collection's current schema.
    ///
    /// Always fatal for the call that observed it; never treated as
    /// "not found". Carries a size-capped dump of the offending value.
    #[error("decode error in collection '{collection}': {source} (value: {raw})")]
    Decode {
        /// The collection whose schema was violated.
        collection: &'static str,
        /// The underlying deserialization error.
        source: serde_json::Error,
        /// Size-capped dump of the offending raw value.
        raw: String,
    },

    /// A key or payload could not be serialized for storage.
    #[error("encode error in collection '{collection}': {source}")]
    Encode {
        /// The collection being written to.
        collection: &'static str,
        /// The underlying serialization error.
        source: serde_json::Error,
    },

    /// A schema migration failed; the application must not start.
    #[error("migration '{name}' failed: {source}")]
    Migration {
        /// The migration that failed.
        name: &'static str,
        /// The underlying store error.
        source: Box<StoreError>,
    },

    /// A configuration error (bad connection URL, etc.).
    #[error("configuration error: {0}")]
    Config(String),
}
