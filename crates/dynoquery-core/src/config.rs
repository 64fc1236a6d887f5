//! Engine configuration.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::rate_limit::valid_rate;

/// Largest number of keys the store accepts in one batch-get request.
pub const MAX_BATCH_GET_KEYS: usize = 100;

/// Tunables shared by every builder created from one table handle.
///
/// Deserializes from partial documents; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum re-issues of a request after retryable errors. `None`, the
    /// default, retries until the store answers.
    pub max_retries: Option<u32>,
    /// Delay before the first retry.
    pub retry_initial_delay: Duration,
    /// Upper bound for the exponential retry delay.
    pub retry_max_delay: Duration,
    /// Client-side read throttle in capacity units per second. `None` disables
    /// throttling.
    pub read_capacity_per_second: Option<f64>,
    /// How often a throttled request re-checks its token budget.
    pub rate_limit_poll_interval: Duration,
    /// Keys per batch-get request. Values outside `1..=100` are clamped when
    /// the batch is chunked.
    pub batch_get_chunk_size: usize,
}

impl EngineConfig {
    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_retries: match env::var("DYNOQUERY_MAX_RETRIES") {
                Ok(v) if v.eq_ignore_ascii_case("unlimited") => None,
                Ok(v) => v.parse().ok().or(defaults.max_retries),
                Err(_) => defaults.max_retries,
            },
            retry_initial_delay: env_millis(
                "DYNOQUERY_RETRY_INITIAL_DELAY_MS",
                defaults.retry_initial_delay,
            ),
            retry_max_delay: env_millis("DYNOQUERY_RETRY_MAX_DELAY_MS", defaults.retry_max_delay),
            read_capacity_per_second: env::var("DYNOQUERY_READ_CAPACITY_PER_SECOND")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| valid_rate(*v)),
            rate_limit_poll_interval: env_millis(
                "DYNOQUERY_RATE_LIMIT_POLL_MS",
                defaults.rate_limit_poll_interval,
            ),
            batch_get_chunk_size: env::var("DYNOQUERY_BATCH_GET_CHUNK_SIZE")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .map_or(defaults.batch_get_chunk_size, |n| {
                    n.clamp(1, MAX_BATCH_GET_KEYS)
                }),
        }
    }

    /// Configuration with zero retry and poll delays, for tests.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            retry_initial_delay: Duration::ZERO,
            retry_max_delay: Duration::ZERO,
            rate_limit_poll_interval: Duration::from_millis(1),
            ..Self::default()
        }
    }

    /// Set the client-side read throttle.
    #[must_use]
    pub fn with_read_capacity(mut self, units_per_second: f64) -> Self {
        self.read_capacity_per_second = Some(units_per_second).filter(|v| valid_rate(*v));
        self
    }

    /// Set the retry budget.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: Option<u32>) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the batch-get chunk size, clamped to `1..=100`.
    #[must_use]
    pub fn with_batch_get_chunk_size(mut self, size: usize) -> Self {
        self.batch_get_chunk_size = size.clamp(1, MAX_BATCH_GET_KEYS);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retries: None,
            retry_initial_delay: Duration::from_millis(50),
            retry_max_delay: Duration::from_millis(1000),
            read_capacity_per_second: None,
            rate_limit_poll_interval: Duration::from_millis(25),
            batch_get_chunk_size: MAX_BATCH_GET_KEYS,
        }
    }
}

fn env_millis(key: &str, default: Duration) -> Duration {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}
