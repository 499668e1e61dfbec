//! Read-through caching services for the Riftline aggregation service.
//!
//! Every domain entity (summoner profiles, champion masteries, league
//! standings, challenge progress, linked accounts, live-game records
//! from the official API and from two independent scraped sources) is
//! cached in its own store collection behind the same read-through
//! algorithm: return a fresh-enough cached value, otherwise fetch from
//! the upstream source and persist the result before returning it.
//!
//! Upstream access is abstracted behind the [`Fetch`] capability so the
//! HTTP clients and page scrapers (out of scope here) plug in from the
//! outside, and tests plug in scripted fakes.
//!
//! # Modules
//!
//! - [`policy`] -- the generic read-through algorithm and refresh modes
//! - [`fetch`] -- the upstream-source capability and its error contract
//! - [`summoner`], [`mastery`], [`league`], [`challenge`], [`account`],
//!   [`live_game`] -- one TTL-bound service per entity
//! - [`shards`], [`hall_of_fame`] -- set-valued collections maintained
//!   by reconciliation, never by eviction
//! - [`eviction`] -- collection registry, boot-time `ensure`, and the
//!   scheduled sweep
//! - [`error`] -- shared error types
//!
//! [`Fetch`]: fetch::Fetch

pub mod account;
pub mod challenge;
pub mod error;
pub mod eviction;
pub mod fetch;
pub mod hall_of_fame;
pub mod league;
pub mod live_game;
pub mod mastery;
pub mod policy;
pub mod shards;
pub mod summoner;

pub use account::AccountService;
pub use challenge::ChallengeService;
pub use error::CacheError;
pub use eviction::{CacheTtls, ensure_collections, sweep};
pub use fetch::{Fetch, FetchError};
pub use hall_of_fame::HallOfFameService;
pub use league::LeagueService;
pub use live_game::{LiveGameService, SnapshotService, SpectateGames, TrackerGames};
pub use mastery::MasteryService;
pub use policy::{ForceMode, ReadThrough, Refresh};
pub use shards::ShardService;
pub use summoner::SummonerService;
