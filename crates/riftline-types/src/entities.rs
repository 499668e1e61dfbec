//! Entity payloads as fetched from upstream sources.
//!
//! These are the `payload` halves of the cached records. They carry
//! whatever the upstream returned at fetch time; freshness bookkeeping
//! (`inserted_at`) lives in the store, never in the payload.
//!
//! Payload shapes are part of the persisted schema: any change here must
//! be accompanied by a recorded migration (typically a cache reset for
//! the affected collection).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ChampionId, GameId, Platform, Puuid, SummonerId};

/// A summoner profile from the official API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummonerProfile {
    /// Encrypted summoner id.
    pub summoner_id: SummonerId,
    /// Platform-independent player id.
    pub puuid: Puuid,
    /// Display name at fetch time.
    pub name: String,
    /// Icon shown on the profile.
    pub profile_icon_id: i32,
    /// Summoner level.
    pub summoner_level: i64,
}

/// All champion masteries of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChampionMasteries {
    /// The player the masteries belong to.
    pub puuid: Puuid,
    /// Per-champion mastery entries, highest points first as returned
    /// upstream.
    pub masteries: Vec<ChampionMastery>,
}

/// Mastery progress on a single champion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChampionMastery {
    /// The champion.
    pub champion_id: ChampionId,
    /// Mastery level (1..=7 under the classic system).
    pub champion_level: i32,
    /// Lifetime mastery points.
    pub champion_points: i64,
    /// Last time this champion was played.
    pub last_play_time: DateTime<Utc>,
    /// Whether the seasonal chest was already granted on this champion.
    pub chest_granted: bool,
    /// Mastery tokens earned toward the next level.
    pub tokens_earned: i32,
}

/// All ranked league entries of one summoner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueEntries {
    /// The summoner the entries belong to.
    pub summoner_id: SummonerId,
    /// One entry per ranked queue the summoner has placed in.
    pub entries: Vec<LeagueEntry>,
}

/// Standing in a single ranked queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueEntry {
    /// Queue identifier (e.g. `RANKED_SOLO_5x5`).
    pub queue_type: String,
    /// Tier name (e.g. `GOLD`).
    pub tier: String,
    /// Division within the tier (e.g. `II`).
    pub rank: String,
    /// League points within the division.
    pub league_points: i32,
    /// Ranked wins this season.
    pub wins: i32,
    /// Ranked losses this season.
    pub losses: i32,
    /// Whether the summoner is on a hot streak.
    pub hot_streak: bool,
}

/// Challenge progress of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeProgress {
    /// The player the progress belongs to.
    pub puuid: Puuid,
    /// Total challenge points across all categories.
    pub total_points: ChallengePoints,
    /// Points per category, keyed by category name.
    pub category_points: BTreeMap<String, ChallengePoints>,
    /// Individual challenge entries.
    pub challenges: Vec<ChallengeEntry>,
}

/// Point total at one level of the challenge hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengePoints {
    /// Tier name reached (e.g. `MASTER`).
    pub level: String,
    /// Current points.
    pub current: i64,
    /// Maximum attainable points.
    pub max: i64,
}

/// Progress on a single challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeEntry {
    /// Numeric challenge identifier.
    pub challenge_id: i64,
    /// Tier name reached.
    pub level: String,
    /// Current metric value.
    pub value: f64,
    /// Percentile of the player base at or below this value.
    pub percentile: f64,
}

/// A linked account record from the account API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiotAccount {
    /// Platform-independent player id.
    pub puuid: Puuid,
    /// Display name half of the id.
    pub game_name: String,
    /// Tag line half of the id (after the `#`).
    pub tag_line: String,
}

/// A live game as reported by the official spectator API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveGame {
    /// Numeric game id.
    pub game_id: GameId,
    /// Platform the game is played on.
    pub platform: Platform,
    /// Queue/game mode name.
    pub game_mode: String,
    /// Wall-clock start time of the game.
    pub game_start: DateTime<Utc>,
    /// All ten participants.
    pub participants: Vec<ActiveGameParticipant>,
}

/// One participant of an official live-game record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveGameParticipant {
    /// Platform-independent player id, when the API exposes it.
    pub puuid: Option<Puuid>,
    /// Display name at game start.
    pub summoner_name: String,
    /// Champion being played.
    pub champion_id: ChampionId,
    /// Team the participant is on (100 or 200).
    pub team_id: i32,
}

/// A live-game snapshot scraped from a third-party page.
///
/// Both scraped sources produce this shape; they are cached in separate
/// collections because the sources update independently and disagree
/// mid-game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedGame {
    /// Numeric game id.
    pub game_id: GameId,
    /// Platform the game is played on.
    pub platform: Platform,
    /// Per-player scraped details.
    pub players: Vec<ScrapedPlayer>,
}

/// Display details of a hall-of-fame member, cached at induction time
/// so the hall-of-fame page renders without re-fetching accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallOfFameMember {
    /// Display name half of the id at induction time.
    pub game_name: String,
    /// Tag line half of the id at induction time.
    pub tag_line: String,
}

/// One player row of a scraped live-game page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedPlayer {
    /// Display name as shown on the page.
    pub summoner_name: String,
    /// Champion being played.
    pub champion_id: ChampionId,
    /// Scraped rank label (e.g. `Diamond II`), when present.
    pub rank: Option<String>,
    /// Scraped ranked win rate in percent, when present.
    pub win_rate: Option<f32>,
    /// Team the player is on (100 or 200).
    pub team_id: i32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn summoner_profile_round_trips() {
        let profile = SummonerProfile {
            summoner_id: SummonerId::new("enc-1"),
            puuid: Puuid::new("p-1"),
            name: "Hide on bush".to_owned(),
            profile_icon_id: 6,
            summoner_level: 742,
        };
        let json = serde_json::to_value(&profile).unwrap();
        let back: SummonerProfile = serde_json::from_value(json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn scraped_game_tolerates_missing_rank() {
        let json = serde_json::json!({
            "game_id": 42,
            "platform": "kr",
            "players": [{
                "summoner_name": "anon",
                "champion_id": 103,
                "rank": null,
                "win_rate": null,
                "team_id": 100
            }]
        });
        let game: ScrapedGame = serde_json::from_value(json).unwrap();
        assert_eq!(game.platform, Platform::Kr);
        let player = game.players.first().unwrap();
        assert!(player.rank.is_none());
    }
}
