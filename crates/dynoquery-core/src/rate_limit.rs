//! Client-side read throttling driven by reported consumed capacity.
//!
//! A token bucket holds at most one second of capacity. Pages debit the
//! capacity they report after they arrive, so the balance may go negative;
//! the next request waits until refill brings it back to zero or above.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::EngineConfig;

/// Token bucket owned by one paginated operation.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    units_per_second: f64,
    balance: f64,
    refilled_at: Instant,
    poll_interval: Duration,
}

impl RateLimiter {
    /// A full bucket refilling at `units_per_second`.
    #[must_use]
    pub fn new(units_per_second: f64, poll_interval: Duration) -> Self {
        Self::new_at(units_per_second, poll_interval, Instant::now())
    }

    /// A full bucket whose refill clock starts at `now`.
    #[must_use]
    pub fn new_at(units_per_second: f64, poll_interval: Duration, now: Instant) -> Self {
        Self {
            units_per_second,
            balance: units_per_second,
            refilled_at: now,
            poll_interval,
        }
    }

    /// A limiter when `config` enables throttling.
    ///
    /// A rate that is not a positive finite number never refills, so it
    /// disables throttling instead.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Option<Self> {
        config
            .read_capacity_per_second
            .filter(|rate| valid_rate(*rate))
            .map(|rate| Self::new(rate, config.rate_limit_poll_interval))
    }

    /// Current balance after refilling up to `now`.
    pub fn balance_at(&mut self, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(self.refilled_at).as_secs_f64();
        self.balance = (self.balance + elapsed * self.units_per_second).min(self.units_per_second);
        self.refilled_at = now;
        self.balance
    }

    /// Whether a request may be sent at `now`.
    pub fn try_admit_at(&mut self, now: Instant) -> bool {
        self.balance_at(now) >= 0.0
    }

    /// Debit capacity reported by a page.
    pub fn consume(&mut self, units: f64) {
        if units > 0.0 {
            self.balance -= units;
        }
    }

    /// Wait until a request may be sent.
    pub async fn acquire(&mut self) {
        while !self.try_admit_at(Instant::now()) {
            debug!(
                balance = self.balance,
                poll_ms = u64::try_from(self.poll_interval.as_millis()).unwrap_or(u64::MAX),
                "Read capacity exhausted, waiting"
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

pub(crate) fn valid_rate(units_per_second: f64) -> bool {
    units_per_second.is_finite() && units_per_second > 0.0
}
