//! Exponential backoff retry for retryable errors (§4.16, §7): 3 attempts by
//! default, starting at 1s and doubling up to a 10s cap.

use std::time::Duration as StdDuration;

use originals_core::OriginalsError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_DELAY: StdDuration = StdDuration::from_secs(1);
pub const DEFAULT_MAX_DELAY: StdDuration = StdDuration::from_secs(10);

pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: StdDuration,
    pub max_delay: StdDuration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, initial_delay: DEFAULT_INITIAL_DELAY, max_delay: DEFAULT_MAX_DELAY }
    }
}

impl RetryPolicy {
    fn delay_for_attempt(&self, attempt: u32) -> StdDuration {
        let scaled = self.initial_delay.saturating_mul(1u32.wrapping_shl(attempt).max(1));
        scaled.min(self.max_delay)
    }
}

/// Retry `f` according to `policy`. Only errors for which
/// [`OriginalsError::is_retryable`] returns `true` are retried; any other
/// error, or the final attempt's error, is returned immediately.
pub async fn retry_with_backoff<F, Fut, T>(policy: &RetryPolicy, mut f: F) -> Result<T, OriginalsError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, OriginalsError>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt + 1 < policy.max_attempts && err.is_retryable() => {
                tracing::warn!(attempt, error = %err, "retrying after backoff");
                tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_retryable_errors_then_succeeds() {
        let policy = RetryPolicy { max_attempts: 3, initial_delay: StdDuration::from_millis(1), max_delay: StdDuration::from_millis(5) };
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(OriginalsError::NetworkUnavailable("timeout".into()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_returns_immediately() {
        let policy = RetryPolicy { max_attempts: 3, initial_delay: StdDuration::from_millis(1), max_delay: StdDuration::from_millis(5) };
        let calls = AtomicU32::new(0);
        let result: Result<(), OriginalsError> = retry_with_backoff(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(OriginalsError::InvalidFeeRate(0)) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausts_attempts_and_returns_last_error() {
        let policy = RetryPolicy { max_attempts: 2, initial_delay: StdDuration::from_millis(1), max_delay: StdDuration::from_millis(5) };
        let calls = AtomicU32::new(0);
        let result: Result<(), OriginalsError> = retry_with_backoff(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(OriginalsError::NetworkUnavailable("down".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
