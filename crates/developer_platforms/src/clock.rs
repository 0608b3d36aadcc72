//! Time sources used by the throttle and the retry logic.
//!
//! All waiting in the tool goes through a [`Clock`] so that the pacing policy
//! can be exercised without real delays.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;

/// A source of time that can also suspend the caller.
#[async_trait]
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current instant according to this clock.
    fn now(&self) -> Instant;

    /// Suspends the caller for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

#[derive(Debug, Default)]
struct ManualClockState {
    offset: Duration,
    sleeps: Vec<Duration>,
}

/// A virtual clock that never blocks.
///
/// Sleeping advances the virtual time by the requested duration and records
/// the request, which makes the pacing decisions observable.
///
/// # Examples
///
/// ```rust
/// use repo_tally_developer_platforms::clock::{Clock, ManualClock};
/// use std::time::Duration;
///
/// # async fn demo() {
/// let clock = ManualClock::new();
/// let start = clock.now();
///
/// clock.sleep(Duration::from_secs(2)).await;
///
/// assert_eq!(clock.now() - start, Duration::from_secs(2));
/// assert_eq!(clock.sleeps(), vec![Duration::from_secs(2)]);
/// # }
/// ```
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    state: Mutex<ManualClockState>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            state: Mutex::new(ManualClockState::default()),
        }
    }

    /// Moves the virtual time forward without recording a sleep.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.offset += duration;
    }

    /// Every suspension requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.sleeps.clone()
    }

    /// The sum of all requested suspensions.
    pub fn total_slept(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        self.origin + state.offset
    }

    async fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.offset += duration;
        state.sleeps.push(duration);
    }
}
