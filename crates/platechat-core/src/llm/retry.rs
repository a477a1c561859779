//! Bounded exponential backoff for remote completion calls.
//!
//! A call is attempted once, then retried up to `max_retries` more times
//! while it fails with a transient error (see
//! [`CompletionError::is_retryable`]). The wait before retry `n` is
//! `initial_delay * multiplier^(n-1)`, capped at `max_delay`.

use std::future::Future;
use std::time::Duration;

use platechat_types::llm::{CompletionError, ErrorDetails};

/// Default number of retries after the first attempt.
pub const MAX_RETRIES: u32 = 3;

/// Wait before the first retry.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Factor applied to the wait after each failed attempt.
pub const BACKOFF_MULTIPLIER: u32 = 2;

/// Upper bound on any single wait.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Retry configuration for a completion client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            initial_delay: RETRY_DELAY,
            multiplier: BACKOFF_MULTIPLIER,
            max_delay: MAX_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Default delays with a custom retry count.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Total attempts including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay that follows `current` in the schedule.
    pub fn next_delay(&self, current: Duration) -> Duration {
        current
            .checked_mul(self.multiplier)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Every wait the policy would perform if all attempts fail transiently.
    pub fn backoff_schedule(&self) -> Vec<Duration> {
        let mut delays = Vec::with_capacity(self.max_retries as usize);
        let mut delay = self.initial_delay.min(self.max_delay);
        for _ in 0..self.max_retries {
            delays.push(delay);
            delay = self.next_delay(delay);
        }
        delays
    }
}

/// Run `op` under `policy`.
///
/// `op` receives the 1-based attempt number. Terminal errors are returned
/// immediately; after the last transient failure the most recent error is
/// returned unchanged.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, CompletionError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, CompletionError>>,
{
    let max_attempts = policy.max_attempts();
    let mut delay = policy.initial_delay.min(policy.max_delay);
    let mut last_error: Option<CompletionError> = None;

    for attempt in 1..=max_attempts {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "completion request succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if !err.is_retryable() => {
                tracing::warn!(
                    attempt,
                    code = err.code(),
                    error = %err,
                    "completion request failed with terminal error"
                );
                return Err(err);
            }
            Err(err) => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    code = err.code(),
                    error = %err,
                    "completion request failed"
                );
                last_error = Some(err);
                if attempt < max_attempts {
                    tracing::debug!(delay_ms = delay.as_millis() as u64, "backing off before retry");
                    tokio::time::sleep(delay).await;
                    delay = policy.next_delay(delay);
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        CompletionError::connection_failed("unknown error occurred", ErrorDetails::default())
    }))
}
