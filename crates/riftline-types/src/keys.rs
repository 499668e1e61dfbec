//! Composite natural keys for the cached collections.
//!
//! Every cached record is addressed by exactly one of these key shapes.
//! Keys are serialized to canonical JSON and compared structurally by
//! the store, so the serde representation here *is* the uniqueness
//! contract: changing a field name or tag is a schema change and must go
//! through a recorded migration.
//!
//! Summoners and accounts are reachable through two key shapes each
//! (lookup by name vs. lookup by id). The two shapes are cached as
//! independent documents; a cascade delete removes both.

use serde::{Deserialize, Serialize};

use crate::ids::{ChampionId, GameId, Platform, Puuid, SummonerId, UserId};

/// Natural key of a cached summoner profile.
///
/// Internally tagged (`"by"`) so both shapes live in one collection
/// under one unique index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum SummonerKey {
    /// Lookup by platform and (case-normalized) summoner name.
    Name {
        /// Platform the summoner lives on.
        platform: Platform,
        /// Summoner name, lowercased by the caller.
        name: String,
    },
    /// Lookup by platform and encrypted summoner id.
    Id {
        /// Platform the summoner lives on.
        platform: Platform,
        /// Encrypted summoner id.
        summoner_id: SummonerId,
    },
}

/// Natural key of a cached account record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum AccountKey {
    /// Lookup by the platform-independent player id.
    Puuid {
        /// The player's PUUID.
        puuid: Puuid,
    },
    /// Lookup by the visible game name and tag line.
    RiotId {
        /// Display name half of the id.
        game_name: String,
        /// Tag line half of the id (after the `#`).
        tag_line: String,
    },
}

/// Natural key of a live-game record: one game on one platform.
///
/// Shared by the official spectator collection and both scraped
/// snapshot collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameKey {
    /// Platform the game is being played on.
    pub platform: Platform,
    /// Numeric game id.
    pub game_id: GameId,
}

/// Natural key of a cached league-entries record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeagueKey {
    /// Platform the summoner lives on.
    pub platform: Platform,
    /// Encrypted summoner id the entries belong to.
    pub summoner_id: SummonerId,
}

/// Natural key of one champion-shard count: user, linked account,
/// champion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardKey {
    /// Application user owning the shard record.
    pub user: UserId,
    /// Linked account the shards were counted on.
    pub puuid: Puuid,
    /// Champion the shards are for.
    pub champion_id: ChampionId,
}

/// Natural key of one hall-of-fame membership: user and linked account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HallOfFameKey {
    /// Application user that earned membership.
    pub user: UserId,
    /// Linked account the membership was earned on.
    pub puuid: Puuid,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn summoner_key_shapes_are_distinct() {
        let by_name = SummonerKey::Name {
            platform: Platform::Euw1,
            name: "faker".to_owned(),
        };
        let by_id = SummonerKey::Id {
            platform: Platform::Euw1,
            summoner_id: SummonerId::new("enc-123"),
        };

        let name_json = serde_json::to_value(&by_name).unwrap();
        let id_json = serde_json::to_value(&by_id).unwrap();
        assert_ne!(name_json, id_json);
        assert_eq!(name_json["by"], "name");
        assert_eq!(id_json["by"], "id");
    }

    #[test]
    fn game_key_round_trips() {
        let key = GameKey {
            platform: Platform::Kr,
            game_id: GameId(99),
        };
        let json = serde_json::to_value(key).unwrap();
        let back: GameKey = serde_json::from_value(json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn shard_key_includes_all_three_parts() {
        let key = ShardKey {
            user: UserId::new(),
            puuid: Puuid::new("p-1"),
            champion_id: ChampionId(266),
        };
        let json = serde_json::to_value(&key).unwrap();
        assert!(json.get("user").is_some());
        assert!(json.get("puuid").is_some());
        assert!(json.get("champion_id").is_some());
    }
}
