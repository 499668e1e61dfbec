//! The daily tick scheduler.
//!
//! Lifecycle: armed once at startup with a delay computed from the
//! wall clock to the next UTC midnight (drift-corrected -- the delay is
//! derived from the current time, not accumulated from fixed
//! intervals), then re-armed on a fixed 24-hour interval after every
//! tick. Torn down only at process exit.
//!
//! A tick that would have fired while the process was suspended is not
//! replayed; the next tick fires at the next armed boundary. Lagged
//! subscribers drop old ticks (broadcast semantics) instead of ever
//! blocking the scheduler.

use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::clock::Clock;

/// Fixed re-arm interval between ticks.
const REARM_INTERVAL: Duration = Duration::from_secs(86_400);

/// Capacity of the tick broadcast channel. Ticks are a day apart, so
/// lag means a subscriber has been stuck for days; dropping its backlog
/// is correct.
const TICK_CHANNEL_CAPACITY: usize = 8;

/// One scheduler tick, carrying the emission time truncated to the
/// whole minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Emission time, truncated to the minute.
    pub at: DateTime<Utc>,
}

/// The process-wide daily scheduler.
///
/// Construct once at boot, hand out receivers via [`subscribe`], then
/// consume it with [`spawn`].
///
/// [`subscribe`]: DailyScheduler::subscribe
/// [`spawn`]: DailyScheduler::spawn
pub struct DailyScheduler<C> {
    clock: C,
    tx: broadcast::Sender<Tick>,
}

impl<C> DailyScheduler<C>
where
    C: Clock + 'static,
{
    /// Create a scheduler reading time from the given clock.
    pub fn new(clock: C) -> Self {
        let (tx, _) = broadcast::channel(TICK_CHANNEL_CAPACITY);
        Self { clock, tx }
    }

    /// Subscribe to future ticks.
    pub fn subscribe(&self) -> broadcast::Receiver<Tick> {
        self.tx.subscribe()
    }

    /// Arm the scheduler and run it until the task is aborted.
    ///
    /// The returned handle is held by the binary for the process
    /// lifetime; aborting it is the only way the timer stops.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let initial = delay_until_next_utc_midnight(self.clock.now_utc());
        tracing::info!(
            initial_delay_secs = initial.as_secs(),
            "Daily scheduler armed"
        );
        tokio::time::sleep(initial).await;

        loop {
            let at = truncate_to_minute(self.clock.now_utc());
            match self.tx.send(Tick { at }) {
                Ok(subscribers) => {
                    tracing::info!(at = %at.to_rfc3339(), subscribers, "Daily tick emitted");
                }
                Err(_) => {
                    tracing::debug!(at = %at.to_rfc3339(), "Daily tick emitted with no subscribers");
                }
            }
            tokio::time::sleep(REARM_INTERVAL).await;
        }
    }
}

/// Compute the delay from `now` to the next UTC-midnight boundary.
///
/// Exactly at midnight the next boundary is a full day away. The value
/// is computed once from the wall clock when the scheduler arms; it is
/// not accumulated across intervals.
pub fn delay_until_next_utc_midnight(now: DateTime<Utc>) -> Duration {
    let today = now.date_naive();
    let Some(tomorrow) = today.succ_opt() else {
        // Calendar end; no boundary left to wait for.
        return Duration::ZERO;
    };
    let Some(midnight) = tomorrow.and_hms_opt(0, 0, 0) else {
        return Duration::ZERO;
    };
    midnight
        .and_utc()
        .signed_duration_since(now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Truncate a timestamp to the whole minute.
pub fn truncate_to_minute(at: DateTime<Utc>) -> DateTime<Utc> {
    at.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::clock::FixedClock;

    use super::*;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        rfc3339.parse().unwrap()
    }

    #[test]
    fn midday_is_half_a_day_from_the_boundary() {
        let delay = delay_until_next_utc_midnight(at("2026-08-07T12:00:00Z"));
        assert_eq!(delay, Duration::from_secs(43_200));
    }

    #[test]
    fn exactly_midnight_waits_a_full_day() {
        let delay = delay_until_next_utc_midnight(at("2026-08-07T00:00:00Z"));
        assert_eq!(delay, Duration::from_secs(86_400));
    }

    #[test]
    fn one_second_before_midnight_waits_one_second() {
        let delay = delay_until_next_utc_midnight(at("2026-08-07T23:59:59Z"));
        assert_eq!(delay, Duration::from_secs(1));
    }

    #[test]
    fn subsecond_drift_is_not_rounded_away() {
        let delay = delay_until_next_utc_midnight(at("2026-08-07T23:59:59.250Z"));
        assert_eq!(delay, Duration::from_millis(750));
    }

    #[test]
    fn truncation_drops_seconds_and_subseconds() {
        let truncated = truncate_to_minute(at("2026-08-07T13:37:42.987Z"));
        assert_eq!(truncated, at("2026-08-07T13:37:00Z"));
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_fire_at_the_boundary_and_rearm_daily() {
        let clock = FixedClock(at("2026-08-07T18:00:00.500Z"));
        let scheduler = DailyScheduler::new(clock);
        let mut ticks = scheduler.subscribe();
        let handle = scheduler.spawn();

        // Paused time auto-advances through the six-hour arming delay
        // and then through each 24-hour re-arm.
        let first = ticks.recv().await.unwrap();
        let second = ticks.recv().await.unwrap();

        // The clock is pinned, so every tick carries the same
        // minute-truncated instant.
        assert_eq!(first.at, at("2026-08-07T18:00:00Z"));
        assert_eq!(second.at, first.at);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn late_subscribers_only_see_later_ticks() {
        let clock = FixedClock(at("2026-08-07T18:00:00Z"));
        let scheduler = DailyScheduler::new(clock);
        let mut early = scheduler.subscribe();
        let handle = scheduler.spawn();

        let _ = early.recv().await.unwrap();

        // A receiver created after a tick starts at the stream's tail:
        // the tick it missed is not replayed, it simply waits for the
        // next boundary.
        let mut late = early.resubscribe();
        let next = late.recv().await.unwrap();
        assert_eq!(next.at, at("2026-08-07T18:00:00Z"));

        handle.abort();
    }
}
