//! Daily tick scheduler for the Riftline aggregation service.
//!
//! A single process-wide recurring timer drives the cache eviction
//! sweeps: once armed, it fires at the next UTC-midnight boundary and
//! then every 24 hours, broadcasting a minute-truncated timestamp to
//! every subscribed service.
//!
//! The clock is injected ([`Clock`]) rather than read ambiently so
//! tests can pin the wall time and assert emitted ticks
//! deterministically.
//!
//! # Modules
//!
//! - [`clock`] -- the injected time source
//! - [`daily`] -- the scheduler itself and its tick payload

pub mod clock;
pub mod daily;

pub use clock::{Clock, FixedClock, SystemClock};
pub use daily::{DailyScheduler, Tick, delay_until_next_utc_midnight, truncate_to_minute};
