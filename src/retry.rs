//! Exponential backoff.
//!
//! [`BackoffPolicy`] is a pure timing strategy: how long to wait after each
//! consecutive transient failure, and whether to give up. The `retry` driver
//! applies it to an async operation whose failures are classified as
//! transient or permanent; a permanent failure short-circuits all remaining
//! attempts.

use std::future::Future;
use std::time::Duration;
use tracing::info;

/// Failure classification for a retryable operation.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Worth retrying; the policy schedules the next attempt.
    Transient(E),
    /// Must not be retried; returned to the caller immediately.
    Permanent(E),
}

impl<E> RetryError<E> {
    /// Unwrap the underlying error regardless of classification.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Transient(e) | RetryError::Permanent(e) => e,
        }
    }
}

/// Exponential backoff timing strategy.
///
/// The default is unbounded: the calling contexts are "wait for credentials
/// to exist", which may take arbitrarily long.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Growth factor applied per consecutive failure.
    pub multiplier: f64,
    /// Ceiling on any single delay.
    pub max_delay: Duration,
    /// Total attempt ceiling; `None` retries indefinitely.
    pub max_attempts: Option<usize>,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            multiplier: 1.5,
            max_delay: Duration::from_secs(60),
            max_attempts: None,
        }
    }
}

impl BackoffPolicy {
    /// Policy with no delays, for tests and eager callers.
    pub fn immediate() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            multiplier: 1.0,
            max_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Delay to wait after the `failures`-th consecutive transient failure
    /// (1-based). Pure; grows exponentially and is capped at `max_delay`.
    pub fn delay_after(&self, failures: usize) -> Duration {
        let exp = failures.saturating_sub(1) as i32;
        let scaled = self.initial_delay.as_secs_f64() * self.multiplier.powi(exp);
        let capped = scaled.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }

    /// Whether another attempt is allowed after `failures` transient failures.
    pub fn allows_retry(&self, failures: usize) -> bool {
        match self.max_attempts {
            Some(max) => failures < max,
            None => true,
        }
    }

    /// Invoke `op` until it succeeds, fails permanently, or exhausts the
    /// attempt ceiling. `op` receives the number of failures so far.
    ///
    /// Logs a message per transient failure so an operator can see the
    /// process is alive but blocked.
    pub async fn retry<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, RetryError<E>>>,
    {
        let mut failures = 0;
        loop {
            match op(failures).await {
                Ok(value) => return Ok(value),
                Err(RetryError::Permanent(e)) => return Err(e),
                Err(RetryError::Transient(e)) => {
                    failures += 1;
                    if !self.allows_retry(failures) {
                        return Err(e);
                    }
                    let delay = self.delay_after(failures);
                    info!(failures, delay_ms = delay.as_millis() as u64, "retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
