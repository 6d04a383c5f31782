//! Bounded retry with exponential backoff.
//!
//! Two callers share this: connection bootstrap (the database may come up
//! after the service in an orchestrated deployment) and anything that wants
//! to re-run a conditional update after losing a write race.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Backoff schedule for a retried operation.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt; total attempts = max_retries + 1
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Ceiling the doubling schedule never exceeds
    pub max_delay: Duration,
    /// Randomize each delay to 50-100% of its nominal value
    pub jitter: bool,
}

impl RetryConfig {
    /// Three retries, 100ms doubling up to 5s, with jitter.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Deterministic delays, mainly for tests
    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    fn delay_for(&self, retry: u32) -> Duration {
        let doubled = self
            .base_delay
            .saturating_mul(1u32 << retry.min(16))
            .min(self.max_delay);
        if self.jitter { spread(doubled) } else { doubled }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            jitter: true,
        }
    }
}

/// Scale a delay to a pseudo-random point in [50%, 100%] of its value.
///
/// Hashing the current time through `RandomState` is enough entropy to keep
/// a fleet of restarting instances from reconnecting in lockstep; no need
/// to pull in a full RNG for that.
fn spread(delay: Duration) -> Duration {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let percent = 50 + RandomState::new().hash_one(std::time::Instant::now()) % 51;
    delay.mul_f64(percent as f64 / 100.0)
}

/// Run `operation` until it succeeds or the schedule is exhausted.
///
/// The final error is returned unchanged; intermediate failures are logged
/// at debug level with the upcoming delay.
///
/// # Example
/// ```ignore
/// let client = retry_with_backoff(
///     || connect_from_config(&config),
///     RetryConfig::new().with_max_retries(5),
/// )
/// .await?;
/// ```
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    for retry in 0..=config.max_retries {
        match operation().await {
            Ok(value) => {
                if retry > 0 {
                    debug!("Operation succeeded after {} retries", retry);
                }
                return Ok(value);
            }
            Err(e) if retry == config.max_retries => {
                warn!("Operation failed after {} attempts: {}", retry + 1, e);
                return Err(e);
            }
            Err(e) => {
                let delay = config.delay_for(retry);
                debug!(
                    "Operation failed (attempt {}/{}): {}. Retrying in {:?}",
                    retry + 1,
                    config.max_retries + 1,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    unreachable!("loop returns on the final attempt")
}

/// Retry with the default schedule.
pub async fn retry<F, Fut, T, E>(operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_with_backoff(operation, RetryConfig::default()).await
}
