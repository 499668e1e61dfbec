//! The per-collection schema contract.
//!
//! Each cached collection declares its table name, its natural-key and
//! payload types, and its index specs through an implementation of
//! [`CollectionSchema`] -- usually on an empty marker struct. The typed
//! [`Collection`] handle is generic over the schema, so a key of one
//! collection cannot be used against another and an encode/decode
//! mismatch is caught by the type system wherever feasible.
//!
//! [`Collection`]: crate::collection::Collection

use core::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// One index to create for a collection at boot.
///
/// `columns` is a raw column list (optionally with ordering, e.g.
/// `"inserted_at DESC"`). Index names are derived as
/// `{collection}_{suffix}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    /// Suffix appended to the collection name to form the index name.
    pub suffix: &'static str,
    /// Raw column list for the index definition.
    pub columns: &'static str,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
}

impl IndexSpec {
    /// The unique natural-key index every collection carries.
    pub const fn unique_key() -> Self {
        Self {
            suffix: "key_idx",
            columns: "key",
            unique: true,
        }
    }

    /// The descending `inserted_at` index used by freshness filters and
    /// eviction sweeps on TTL-bound collections.
    pub const fn inserted_at() -> Self {
        Self {
            suffix: "inserted_at_idx",
            columns: "inserted_at DESC",
            unique: false,
        }
    }
}

/// Schema declaration for one cached collection.
///
/// `NAME` must be a valid, hard-coded SQL identifier; it is interpolated
/// into DDL and query strings, so it must never come from runtime input.
pub trait CollectionSchema {
    /// Table name of the collection.
    const NAME: &'static str;

    /// Natural-key type. Serialized to canonical JSONB; structural
    /// equality of the serialized form is the uniqueness contract.
    type Key: Serialize + DeserializeOwned + Debug + Send + Sync;

    /// Payload type. Replaced wholesale on every upsert.
    type Value: Serialize + DeserializeOwned + Debug + Send + Sync;

    /// Index specs to ensure at boot.
    ///
    /// The default covers TTL-bound collections: the unique key index
    /// plus the `inserted_at` sweep index. Set-valued collections
    /// override this to drop the sweep index they never use.
    fn indexes() -> Vec<IndexSpec> {
        vec![IndexSpec::unique_key(), IndexSpec::inserted_at()]
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct DummyKey {
        id: u32,
    }

    struct Dummy;

    impl CollectionSchema for Dummy {
        const NAME: &'static str = "dummies";
        type Key = DummyKey;
        type Value = DummyKey;
    }

    #[test]
    fn default_indexes_cover_key_and_freshness() {
        let indexes = Dummy::indexes();
        assert_eq!(indexes.len(), 2);
        assert!(indexes.iter().any(|i| i.unique && i.columns == "key"));
        assert!(
            indexes
                .iter()
                .any(|i| !i.unique && i.columns.starts_with("inserted_at"))
        );
    }
}
