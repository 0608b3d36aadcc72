//! Bounded retries with linear backoff.

use std::future::Future;
use std::time::Duration;

use repo_tally_developer_platforms::clock::Clock;
use repo_tally_developer_platforms::errors::Error;
use tracing::{debug, warn};

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;

/// How often and how patiently a remote operation is retried.
///
/// Only errors for which [`Error::is_retryable`] holds are retried; the wait
/// before attempt `n + 1` is `n * backoff_step`.
///
/// # Examples
///
/// ```
/// use repo_tally_core::retry::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::commit_stats();
/// assert_eq!(policy.max_attempts, 3);
/// assert_eq!(policy.backoff_for(2), Duration::from_secs(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,

    /// Backoff added per failed attempt
    pub backoff_step: Duration,
}

impl RetryPolicy {
    /// Three attempts, waiting 2s and then 4s between them.
    pub fn commit_stats() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_secs(2),
        }
    }

    /// A single attempt. Paged listings keep whatever they collected on failure.
    pub fn page_listing() -> Self {
        Self {
            max_attempts: 1,
            backoff_step: Duration::ZERO,
        }
    }

    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }

    /// Runs `operation` until it succeeds, fails permanently, or attempts run out.
    ///
    /// The closure receives the 1-based attempt number. The last error is
    /// returned when no attempt succeeds.
    pub async fn run<T, F, Fut>(&self, clock: &dyn Clock, mut operation: F) -> Result<T, Error>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => {
                    debug!(attempt, error_message = e.to_string(), "Error is not retryable");
                    return Err(e);
                }
                Err(e) if attempt >= max_attempts => {
                    debug!(attempt, error_message = e.to_string(), "Out of attempts");
                    return Err(e);
                }
                Err(e) => {
                    let wait = self.backoff_for(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        wait_seconds = wait.as_secs_f64(),
                        error_message = e.to_string(),
                        "Attempt failed. Retrying."
                    );
                    clock.sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }
}
