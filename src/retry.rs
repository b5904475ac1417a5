//! Retry-with-backoff utility used by the fetcher.

use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Run `op` until it succeeds or `max_attempts` is reached.
///
/// Between attempts the task sleeps for `backoff(attempt)`, where `attempt`
/// is the 1-based number of the attempt that just failed. The last error is
/// returned once the budget is exhausted.
pub async fn retry_with_backoff<T, F, Fut, B>(max_attempts: u32, backoff: B, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    B: Fn(u32) -> Duration,
{
    debug_assert!(max_attempts > 0);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt < max_attempts {
                    warn!("attempt {} failed: {:#}; retrying", attempt, e);
                    tokio::time::sleep(backoff(attempt)).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("retry budget exhausted")))
}
