//! Type-safe identifier wrappers for upstream and application IDs.
//!
//! Upstream identifiers are opaque strings (PUUIDs, encrypted summoner
//! IDs) or integers (game and champion IDs); application users are
//! identified by UUID v7. Each gets a newtype so identifiers cannot be
//! mixed up at compile time, mirroring the cached collections' natural
//! keys.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a raw identifier string.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_string_id! {
    /// Globally unique, platform-independent player identifier issued by
    /// the official game API.
    Puuid
}

define_string_id! {
    /// Encrypted per-platform summoner identifier.
    SummonerId
}

/// Numeric identifier of a single game on a platform.
///
/// Only unique in combination with the [`Platform`] it was played on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GameId(pub i64);

impl core::fmt::Display for GameId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for GameId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Numeric champion identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ChampionId(pub i32);

impl core::fmt::Display for ChampionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ChampionId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

/// Unique identifier for an application user (the person linking
/// accounts, not a game identity). UUID v7 (time-ordered) for efficient
/// database indexing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Platform (regional shard) a summoner lives on.
///
/// Serialized in lowercase so natural keys stay stable across the wire
/// and the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Brazil.
    Br1,
    /// Europe Nordic & East.
    Eun1,
    /// Europe West.
    Euw1,
    /// Japan.
    Jp1,
    /// Korea.
    Kr,
    /// Latin America North.
    La1,
    /// Latin America South.
    La2,
    /// North America.
    Na1,
    /// Oceania.
    Oc1,
    /// Turkey.
    Tr1,
    /// Russia.
    Ru,
}

impl Platform {
    /// Return the lowercase platform code used in keys and routing.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Br1 => "br1",
            Self::Eun1 => "eun1",
            Self::Euw1 => "euw1",
            Self::Jp1 => "jp1",
            Self::Kr => "kr",
            Self::La1 => "la1",
            Self::La2 => "la2",
            Self::Na1 => "na1",
            Self::Oc1 => "oc1",
            Self::Tr1 => "tr1",
            Self::Ru => "ru",
        }
    }
}

impl core::fmt::Display for Platform {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn platform_serializes_lowercase() {
        let json = serde_json::to_string(&Platform::Euw1).unwrap();
        assert_eq!(json, "\"euw1\"");

        let parsed: Platform = serde_json::from_str("\"kr\"").unwrap();
        assert_eq!(parsed, Platform::Kr);
    }

    #[test]
    fn string_ids_round_trip() {
        let puuid = Puuid::new("abc-123");
        let json = serde_json::to_string(&puuid).unwrap();
        assert_eq!(json, "\"abc-123\"");

        let back: Puuid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, puuid);
        assert_eq!(back.as_str(), "abc-123");
    }

    #[test]
    fn user_ids_are_unique() {
        let a = UserId::new();
        let b = UserId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn game_id_displays_raw_number() {
        assert_eq!(GameId(7_345_001).to_string(), "7345001");
    }
}
