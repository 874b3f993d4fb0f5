//! Bounded-concurrency batch executor (§4.15): runs many independent
//! operations (batch inscription, batch migration, batch verification)
//! under a concurrency cap, with per-item retry, per-item timeout, and a
//! choice between continuing past failures or aborting the remaining queue
//! on the first one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use originals_core::OriginalsError;
use originals_recovery::{retry_with_backoff, RetryPolicy};

/// Controls how a batch handles a failing item and how hard it tries each one.
pub struct BatchOptions {
    /// Maximum number of items running concurrently.
    pub max_concurrency: usize,
    /// `true`: keep processing remaining items after a failure.
    /// `false`: stop dispatching new items once the first failure lands.
    pub continue_on_error: bool,
    /// Wall-clock budget for a single item, retries included.
    pub per_item_timeout: StdDuration,
    pub retry_policy: RetryPolicy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            continue_on_error: true,
            per_item_timeout: StdDuration::from_secs(30),
            retry_policy: RetryPolicy::default(),
        }
    }
}

pub struct BatchResult<O> {
    /// `(original index, output)` for every item that succeeded.
    pub successful: Vec<(usize, O)>,
    /// `(original index, error)` for every item that failed or was skipped
    /// after a fail-fast abort.
    pub failed: Vec<(usize, OriginalsError)>,
    pub total_processed: usize,
    pub total_duration: StdDuration,
}

impl<O> BatchResult<O> {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run `op` over `items` per `options`, preserving each item's original index
/// in the result (§4.15).
pub async fn run_batch<I, O, F, Fut>(items: Vec<I>, options: BatchOptions, op: F) -> BatchResult<O>
where
    I: Clone + Send + 'static,
    O: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<O, OriginalsError>> + Send,
{
    let started = std::time::Instant::now();
    let op = Arc::new(op);
    let aborted = Arc::new(AtomicBool::new(false));
    let continue_on_error = options.continue_on_error;
    let per_item_timeout = options.per_item_timeout;
    let max_concurrency = options.max_concurrency.max(1);

    let indexed: Vec<(usize, I)> = items.into_iter().enumerate().collect();
    let total = indexed.len();

    let results = stream::iter(indexed.into_iter().map(|(index, item)| {
        let op = Arc::clone(&op);
        let aborted = Arc::clone(&aborted);
        let retry_policy = RetryPolicy {
            max_attempts: options.retry_policy.max_attempts,
            initial_delay: options.retry_policy.initial_delay,
            max_delay: options.retry_policy.max_delay,
        };
        async move {
            if !continue_on_error && aborted.load(Ordering::SeqCst) {
                return (index, Err(OriginalsError::Other("skipped after fail-fast abort".into())));
            }

            let outcome = tokio::time::timeout(per_item_timeout, retry_with_backoff(&retry_policy, || op(item.clone()))).await;

            let result = match outcome {
                Ok(result) => result,
                Err(_) => Err(OriginalsError::NetworkUnavailable(format!("item {index} exceeded per-item timeout"))),
            };

            if result.is_err() && !continue_on_error {
                aborted.store(true, Ordering::SeqCst);
            }

            (index, result)
        }
    }))
    .buffer_unordered(max_concurrency)
    .collect::<Vec<_>>()
    .await;

    let mut successful = Vec::new();
    let mut failed = Vec::new();
    for (index, result) in results {
        match result {
            Ok(output) => successful.push((index, output)),
            Err(err) => failed.push((index, err)),
        }
    }
    successful.sort_by_key(|(index, _)| *index);
    failed.sort_by_key(|(index, _)| *index);

    tracing::info!(total, successful = successful.len(), failed = failed.len(), "batch complete");

    BatchResult { successful, failed, total_processed: total, total_duration: started.elapsed() }
}

/// Fold a batch's timestamp into an §4.15-shaped summary line; exists so
/// callers don't need to import `chrono` just to log a completion time.
pub fn completed_at_now() -> chrono::DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[tokio::test]
    async fn continue_on_error_collects_both_outcomes() {
        let items = vec![1, 2, 3, 4];
        let options = BatchOptions { max_concurrency: 2, continue_on_error: true, ..BatchOptions::default() };
        let result = run_batch(items, options, |i| async move {
            if i % 2 == 0 {
                Ok(i * 10)
            } else {
                Err(OriginalsError::ValidationFailed(format!("odd: {i}")))
            }
        })
        .await;

        assert_eq!(result.total_processed, 4);
        assert_eq!(result.successful.len(), 2);
        assert_eq!(result.failed.len(), 2);
        assert!(result.successful.contains(&(1, 20)));
        assert!(result.successful.contains(&(3, 40)));
    }

    #[tokio::test]
    async fn fail_fast_skips_items_after_first_failure() {
        let items = vec![1, 2, 3, 4, 5];
        let options = BatchOptions { max_concurrency: 1, continue_on_error: false, ..BatchOptions::default() };
        let result = run_batch(items, options, |i| async move {
            if i == 2 {
                Err(OriginalsError::ValidationFailed("boom".into()))
            } else {
                Ok(i)
            }
        })
        .await;

        assert!(!result.all_succeeded());
        assert!(result.successful.iter().any(|(index, _)| *index == 0));
        assert!(result.failed.iter().any(|(index, _)| *index == 1));
        assert!(result.failed.iter().any(|(index, _)| *index >= 2));
    }

    #[tokio::test]
    async fn retries_transient_failures_within_an_item() {
        let calls = Arc::new(AtomicU32::new(0));
        let items = vec![1];
        let options = BatchOptions {
            max_concurrency: 1,
            continue_on_error: true,
            per_item_timeout: StdDuration::from_secs(5),
            retry_policy: RetryPolicy { max_attempts: 3, initial_delay: StdDuration::from_millis(1), max_delay: StdDuration::from_millis(2) },
        };
        let calls_clone = Arc::clone(&calls);
        let result = run_batch(items, options, move |_| {
            let calls = Arc::clone(&calls_clone);
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(OriginalsError::NetworkUnavailable("timeout".into()))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert!(result.all_succeeded());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
