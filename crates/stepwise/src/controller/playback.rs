//! Playback timer state
//!
//! A single [`TimerHandle`] exists while playing. It is a deadline on the
//! Tokio clock rather than a spawned interval, so arming and cancelling work
//! without a running runtime and the controller's loop decides when to wait.

use std::future;
use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::debug;

/// Armed playback timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    period: Duration,
    deadline: Instant,
}

impl TimerHandle {
    fn arm(period: Duration) -> Self {
        Self {
            period,
            deadline: Instant::now() + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

/// Stopped/playing state machine around at most one timer
#[derive(Debug, Clone)]
pub struct PlaybackScheduler {
    interval: Duration,
    timer: Option<TimerHandle>,
}

impl PlaybackScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            timer: None,
        }
    }

    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_playing(&self) -> bool {
        self.timer.is_some()
    }

    pub fn timer(&self) -> Option<&TimerHandle> {
        self.timer.as_ref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.map(|timer| timer.deadline)
    }

    /// Arm the timer; false if one is already armed
    pub fn start(&mut self) -> bool {
        if self.timer.is_some() {
            return false;
        }
        let timer = TimerHandle::arm(self.interval);
        debug!(interval_ms = self.interval.as_millis() as u64, "Playback timer armed");
        self.timer = Some(timer);
        true
    }

    /// Cancel the timer; false if nothing was armed
    pub fn stop(&mut self) -> bool {
        let cancelled = self.timer.take().is_some();
        if cancelled {
            debug!("Playback timer cancelled");
        }
        cancelled
    }

    /// Whether the armed deadline has passed
    pub fn is_due(&self, now: Instant) -> bool {
        self.timer.is_some_and(|timer| timer.deadline <= now)
    }

    /// Push the deadline one period past now after a successful tick
    pub fn rearm(&mut self) {
        if let Some(timer) = self.timer.as_mut() {
            timer.deadline = Instant::now() + timer.period;
        }
    }
}

/// Sleep until `deadline`, or forever when there is none
pub(crate) async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending::<()>().await,
    }
}
