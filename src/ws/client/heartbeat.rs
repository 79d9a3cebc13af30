use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures_util::future;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::status::PlaybackStatus;

/// Recurring heartbeat timer, at most one alive.
#[derive(Debug, Default)]
pub(crate) struct HeartbeatScheduler {
    interval: Option<Interval>,
}

impl HeartbeatScheduler {
    /// Cancel the running timer, if any, and start ticking every `period`.
    /// The first tick comes one `period` from now.
    pub fn start(&mut self, period: Duration) {
        // a zero period would panic in tokio
        let period = period.max(Duration::from_millis(1));

        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        if self.interval.replace(interval).is_some() {
            log::debug!("Previous heartbeat timer canceled");
        }

        log::debug!("Heartbeat every {:?}", period);
    }

    pub fn stop(&mut self) {
        if self.interval.take().is_some() {
            log::debug!("Heartbeat timer stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Wait for the next tick, forever when stopped.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => future::pending().await,
        }
    }
}

/// A paused status that has not changed for longer than `stale_after`.
pub(crate) fn is_stale(status: &PlaybackStatus, now_ms: i64, stale_after: Duration) -> bool {
    let stale_after = i64::try_from(stale_after.as_millis()).unwrap_or(i64::MAX);
    status.paused && now_ms.saturating_sub(status.updated_at) > stale_after
}

pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod test {
    use super::*;

    fn paused_at(updated_at: i64, paused: bool) -> PlaybackStatus {
        PlaybackStatus {
            song: "A".to_string(),
            paused,
            updated_at,
            ..Default::default()
        }
    }

    #[test]
    fn test_stale_only_when_paused_past_threshold() {
        let minute = Duration::from_secs(60);
        let now = 1_000_000;

        assert!(is_stale(&paused_at(now - 61_000, true), now, minute));
        assert!(!is_stale(&paused_at(now - 60_000, true), now, minute));
        assert!(!is_stale(&paused_at(now - 61_000, false), now, minute));
    }

    #[test]
    fn test_stale_extreme_timestamps() {
        let minute = Duration::from_secs(60);

        assert!(is_stale(&paused_at(i64::MIN, true), 1_000_000, minute));
        assert!(!is_stale(&paused_at(i64::MAX, true), i64::MIN, minute));
        assert!(!is_stale(&paused_at(0, true), 120_000, Duration::MAX));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let mut heartbeat = HeartbeatScheduler::default();
        let started = Instant::now();

        heartbeat.start(Duration::from_millis(500));
        heartbeat.tick().await;

        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_cancels_previous_timer() {
        let mut heartbeat = HeartbeatScheduler::default();
        let started = Instant::now();

        heartbeat.start(Duration::from_millis(100));
        heartbeat.start(Duration::from_secs(10));
        heartbeat.tick().await;

        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_timer_never_ticks() {
        let mut heartbeat = HeartbeatScheduler::default();

        heartbeat.start(Duration::from_millis(100));
        heartbeat.stop();
        heartbeat.stop();
        assert!(!heartbeat.is_running());

        let ticked = time::timeout(Duration::from_secs(5), heartbeat.tick()).await;
        assert!(ticked.is_err());
    }
}
