//! Retry logic for network operations with exponential backoff.

use log::{debug, warn};
use std::time::Duration;

use crate::error::{Error, Result};

/// Retry behavior for network operations. Immutable once built.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub enabled: bool,
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Creates a validated policy.
    ///
    /// `max_attempts` must be in 1..=10 (bounded to prevent retry storms) and
    /// `multiplier` must be at least 1.0 (a smaller value would shrink the
    /// delay between attempts).
    pub fn new(
        enabled: bool,
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
        multiplier: f64,
    ) -> Result<Self> {
        if !(1..=10).contains(&max_attempts) {
            return Err(Error::Validation(format!(
                "retry max_attempts must be between 1 and 10, got {}",
                max_attempts
            )));
        }
        if multiplier < 1.0 {
            return Err(Error::Validation(format!(
                "retry multiplier must be at least 1.0, got {}",
                multiplier
            )));
        }
        Ok(Self {
            enabled,
            max_attempts,
            initial_delay,
            max_delay,
            multiplier,
        })
    }

    /// Returns a policy that executes every operation exactly once.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Computes the delay to wait after the failed attempt `attempt` (1-based),
    /// before the next one: `initial_delay * multiplier^(attempt-1)`, clamped
    /// to `max_delay`. The first attempt itself is never delayed.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return self.initial_delay.min(self.max_delay);
        }
        let factor = self.multiplier.powi(attempt as i32 - 1);
        let raw_secs = self.initial_delay.as_secs_f64() * factor;
        if !raw_secs.is_finite() || raw_secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(raw_secs)
    }
}

/// Executes an async operation with retry logic.
///
/// Retries only on transient errors (see [`Error::is_retryable`]); terminal
/// errors propagate immediately. After exhausting attempts the last observed
/// error is returned unchanged.
pub async fn with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &str,
    operation: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    if !policy.enabled {
        return operation().await;
    }

    let mut last_error = None;

    for attempt in 1..=policy.max_attempts {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !e.is_retryable() {
                    debug!("{}: non-retryable error: {}", operation_name, e);
                    return Err(e);
                }

                if attempt < policy.max_attempts {
                    let delay = policy.backoff_delay(attempt);
                    warn!(
                        "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                        operation_name,
                        attempt,
                        policy.max_attempts,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                last_error = Some(e);
            }
        }
    }

    // max_attempts >= 1, so the loop always records an error before exiting
    Err(last_error.unwrap_or_else(|| {
        Error::Connection(format!(
            "{}: failed after {} attempts",
            operation_name, policy.max_attempts
        ))
    }))
}
