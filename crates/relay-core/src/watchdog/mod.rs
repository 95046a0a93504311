//! Liveness watchdog for a single task.
//!
//! The watchdog is a plain state machine polled by the session loop; it owns no task
//! and no timer handle. While armed, [`Watchdog::expired`] resolves at the deadline,
//! so expiry is just another branch of the session's `select!`.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::trace;

#[derive(Clone, Debug, PartialEq, Eq)]
enum WatchdogState {
    Disarmed,
    Armed { deadline: Instant, reason: String },
}

#[derive(Debug)]
pub struct Watchdog {
    interval: Duration,
    state: WatchdogState,
    fired: bool,
}

impl Watchdog {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: WatchdogState::Disarmed,
            fired: false,
        }
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        matches!(self.state, WatchdogState::Armed { .. })
    }

    /// Arms (or re-arms) the watchdog one interval from now.
    ///
    /// The new deadline and reason fully replace any pending ones.
    /// A watchdog that already fired stays disarmed.
    pub fn reset(&mut self, reason: impl Into<String>) -> Option<Instant> {
        if self.fired {
            return None;
        }
        let deadline = Instant::now() + self.interval;
        let reason = reason.into();
        trace!(reason = %reason, interval_ms = self.interval.as_millis() as u64, "watchdog armed");

        self.state = WatchdogState::Armed { deadline, reason };
        Some(deadline)
    }

    /// Disarms the watchdog. Returns `true` if it was armed.
    pub fn cancel(&mut self) -> bool {
        let was_armed = self.is_armed();
        self.state = WatchdogState::Disarmed;
        was_armed
    }

    /// Resolves with the recorded reason once the deadline passes.
    ///
    /// Never resolves while disarmed. Cancel safe: the state only changes after the
    /// deadline has been reached, with no await point in between.
    pub async fn expired(&mut self) -> String {
        let deadline = match &self.state {
            WatchdogState::Armed { deadline, .. } => *deadline,
            WatchdogState::Disarmed => std::future::pending().await,
        };
        sleep_until(deadline).await;

        self.fired = true;
        match std::mem::replace(&mut self.state, WatchdogState::Disarmed) {
            WatchdogState::Armed { reason, .. } => reason,
            WatchdogState::Disarmed => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, timeout};

    const INTERVAL: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn armed_watchdog_fires_after_interval() {
        let mut wd = Watchdog::new(INTERVAL);
        let start = Instant::now();
        wd.reset("slow-load");

        let reason = wd.expired().await;

        assert_eq!(reason, "slow-load");
        assert!(start.elapsed() >= INTERVAL);
        assert!(!wd.is_armed());
        assert!(wd.reset("late").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn disarmed_watchdog_never_fires() {
        let mut wd = Watchdog::new(INTERVAL);
        assert!(timeout(INTERVAL * 10, wd.expired()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_disarms_pending_deadline() {
        let mut wd = Watchdog::new(INTERVAL);
        wd.reset("slow-load");
        advance(Duration::from_secs(30)).await;

        assert!(wd.cancel());
        assert!(!wd.cancel());
        assert!(timeout(INTERVAL * 2, wd.expired()).await.is_err());
        assert!(wd.reset("again").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn second_reset_supersedes_first() {
        let mut wd = Watchdog::new(INTERVAL);
        wd.reset("first");
        advance(Duration::from_secs(30)).await;
        wd.reset("second");

        // The first deadline passes 30s from here and must not fire.
        assert!(timeout(Duration::from_secs(59), wd.expired()).await.is_err());
        assert_eq!(wd.expired().await, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn fired_watchdog_cannot_be_rearmed() {
        let mut wd = Watchdog::new(INTERVAL);
        wd.reset("once");
        wd.expired().await;

        assert!(wd.reset("again").is_none());
        assert!(!wd.is_armed());
    }
}
