//! Client-side pacing of outbound API calls.
//!
//! The throttle keeps a local estimate of the sustained request rate instead
//! of reading the platform's rate limit headers. Every call pays a small fixed
//! delay, and when the estimated hourly rate climbs above the configured
//! ceiling the caller is suspended until the rate is back under it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::clock::Clock;

#[cfg(test)]
#[path = "throttle_tests.rs"]
mod tests;

/// The number of seconds in an hour, as used by the rate estimate.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Pacing settings for the [`Throttle`].
///
/// # Examples
///
/// ```
/// use repo_tally_developer_platforms::throttle::ThrottleConfig;
/// use std::time::Duration;
///
/// let config = ThrottleConfig::default();
/// assert_eq!(config.max_calls_per_hour, 5000);
/// assert_eq!(config.base_delay, Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// The highest sustained rate the throttle allows. Zero disables the rate check.
    pub max_calls_per_hour: u64,

    /// The delay applied after every call while below the escalation threshold
    pub base_delay: Duration,

    /// The delay applied after every call once the escalation threshold is passed
    pub escalated_delay: Duration,

    /// The number of calls after which the escalated delay applies
    pub escalation_threshold: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_calls_per_hour: 5000,
            base_delay: Duration::from_millis(100),
            escalated_delay: Duration::from_millis(150),
            escalation_threshold: 100,
        }
    }
}

/// Paces calls to a remote API.
///
/// The throttle counts calls from the moment it was created. It is shared by
/// reference between all fetch operations of a run.
#[derive(Debug)]
pub struct Throttle {
    calls: AtomicU64,
    clock: Arc<dyn Clock>,
    config: ThrottleConfig,
    started_at: Instant,
}

impl Throttle {
    pub fn new(config: ThrottleConfig, clock: Arc<dyn Clock>) -> Self {
        let started_at = clock.now();
        Self {
            calls: AtomicU64::new(0),
            clock,
            config,
            started_at,
        }
    }

    /// The number of calls registered so far.
    pub fn calls_made(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// The clock the throttle waits on.
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Registers a call and suspends the caller as required by the pacing policy.
    ///
    /// Must be invoked before every outbound request. Returns the total time the
    /// caller was suspended.
    pub async fn throttle(&self) -> Duration {
        let calls = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        let elapsed = self.clock.now().saturating_duration_since(self.started_at);

        let mut waited = Duration::ZERO;
        if let Some(wait) = self.rate_limit_wait(calls, elapsed) {
            warn!(
                calls,
                elapsed_seconds = elapsed.as_secs(),
                wait_seconds = wait.as_secs_f64(),
                "Estimated request rate is above the hourly ceiling. Pausing."
            );
            self.clock.sleep(wait).await;
            waited += wait;
        }

        let delay = self.baseline_delay(calls);
        self.clock.sleep(delay).await;
        waited += delay;

        debug!(
            calls,
            waited_ms = waited.as_millis() as u64,
            "Throttled outbound call"
        );

        waited
    }

    fn baseline_delay(&self, calls: u64) -> Duration {
        if calls > self.config.escalation_threshold {
            self.config.escalated_delay
        } else {
            self.config.base_delay
        }
    }

    /// The extra wait needed to bring `calls` over `elapsed` back under the ceiling.
    ///
    /// The rate is undefined while no time has passed, so no wait is imposed then.
    fn rate_limit_wait(&self, calls: u64, elapsed: Duration) -> Option<Duration> {
        let ceiling = self.config.max_calls_per_hour;
        let elapsed_seconds = elapsed.as_secs_f64();
        if ceiling == 0 || elapsed_seconds <= 0.0 {
            return None;
        }

        let rate = calls as f64 / (elapsed_seconds / SECONDS_PER_HOUR);
        if rate <= ceiling as f64 {
            return None;
        }

        let budget_seconds = calls as f64 * SECONDS_PER_HOUR / ceiling as f64;
        let wait_seconds = budget_seconds - elapsed_seconds;
        if wait_seconds > 0.0 {
            Some(Duration::from_secs_f64(wait_seconds))
        } else {
            None
        }
    }
}
