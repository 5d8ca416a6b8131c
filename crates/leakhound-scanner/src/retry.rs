//! Bounded retry with exponential backoff.

use leakhound_core::RetryConfig;
use leakhound_intelx::IntelxError;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Errors that know whether a repeat attempt could succeed.
pub trait Retryable {
    /// `false` stops the retry loop immediately.
    fn is_retryable(&self) -> bool;
}

impl Retryable for IntelxError {
    fn is_retryable(&self) -> bool {
        self.is_transient()
    }
}

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    multiplier: u32,
}

impl RetryPolicy {
    /// Create a policy. At least one attempt is always made and the delay
    /// never shrinks.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration, multiplier: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            multiplier: multiplier.max(1),
        }
    }

    /// Attempts including the first.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Waits between consecutive attempts: `base, base*m, base*m², ...`,
    /// one fewer than the number of attempts.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let multiplier = self.multiplier;
        std::iter::successors(Some(self.base_delay), move |delay| {
            Some(delay.saturating_mul(multiplier))
        })
        .take(self.max_attempts as usize - 1)
    }

    /// Sum of every backoff wait when all attempts fail.
    #[must_use]
    pub fn total_delay(&self) -> Duration {
        self.delays().fold(Duration::ZERO, Duration::saturating_add)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts run out. The last error is returned.
    pub async fn run<T, E, F, Fut>(&self, what: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + fmt::Display,
    {
        let mut delays = self.delays();
        let mut attempt = 1;

        loop {
            let error = match op().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if !error.is_retryable() {
                tracing::debug!("{} failed with a permanent error: {}", what, error);
                return Err(error);
            }

            let Some(delay) = delays.next() else {
                return Err(error);
            };

            tracing::warn!(
                "{} attempt {}/{} failed: {}. Retrying in {:?}...",
                what,
                attempt,
                self.max_attempts,
                error,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay(), config.multiplier)
    }
}
