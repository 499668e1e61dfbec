//! Shared type definitions for the Riftline aggregation service.
//!
//! This crate holds the vocabulary every other crate speaks: strongly
//! typed identifiers, the natural-key shapes under which cached records
//! are stored, and the entity payloads fetched from upstream sources.
//!
//! # Modules
//!
//! - [`ids`] -- scalar identifier newtypes and the [`Platform`] enum
//! - [`keys`] -- composite natural keys, one per cached collection
//! - [`entities`] -- entity payload structs (what upstream returns)
//!
//! [`Platform`]: ids::Platform

pub mod entities;
pub mod ids;
pub mod keys;

pub use entities::{
    ActiveGame, ActiveGameParticipant, ChallengeEntry, ChallengePoints, ChallengeProgress,
    ChampionMasteries, ChampionMastery, HallOfFameMember, LeagueEntries, LeagueEntry, RiotAccount,
    ScrapedGame, ScrapedPlayer, SummonerProfile,
};
pub use ids::{ChampionId, GameId, Platform, Puuid, SummonerId, UserId};
pub use keys::{AccountKey, GameKey, HallOfFameKey, LeagueKey, ShardKey, SummonerKey};
