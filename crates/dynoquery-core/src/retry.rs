//! Re-issue of requests that failed with a retryable store error.

use std::future::Future;
use std::time::Duration;

use dynoquery_model::{StoreError, StoreOperation};
use tracing::warn;

use crate::config::EngineConfig;
use crate::error::{Error, Result};

/// Retry budget and exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum re-issues after the first attempt. `None` is unbounded.
    pub max_retries: Option<u32>,
    /// Delay before the first re-issue.
    pub initial_delay: Duration,
    /// Cap on the delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Build the policy from engine configuration.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: config.retry_initial_delay,
            max_delay: config.retry_max_delay,
        }
    }

    /// Delay before re-issue number `attempt` (0-based): `initial * 2^attempt`,
    /// capped at `max_delay`.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1_u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Decide what to do after attempt `attempt` (0-based) failed with `err`.
    ///
    /// Returns the delay to wait before re-issuing the same request, or the
    /// error to surface.
    pub fn on_error(
        &self,
        operation: StoreOperation,
        attempt: u32,
        err: StoreError,
    ) -> Result<Duration> {
        if !err.is_retryable() {
            return Err(Error::Store(err));
        }
        if self.max_retries.is_some_and(|max| attempt >= max) {
            return Err(Error::RetriesExhausted {
                attempts: attempt + 1,
                source: err,
            });
        }
        let delay = self.delay(attempt);
        warn!(
            %operation,
            attempt = attempt + 1,
            code = %err.code,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "Retrying after transient store error"
        );
        Ok(delay)
    }

    /// Run `send` until it succeeds, fails permanently or exhausts the budget.
    pub async fn run<T, F, Fut>(&self, operation: StoreOperation, mut send: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, StoreError>>,
    {
        let mut attempt = 0;
        loop {
            match send().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let delay = self.on_error(operation, attempt, err)?;
                    pause(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

pub(crate) async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
