//! Rate limiting and retry utilities for page fetches and geocoding calls.
//!
//! [`retry_with_backoff`] retries transient HTTP failures with exponential
//! backoff. [`RequestPacer`] spaces consecutive requests to a service whose
//! usage policy demands a fixed gap between calls.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::ScraperError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`ScraperError::RateLimited`]: HTTP 429.
/// - [`ScraperError::Http`]: network-level failure (connection reset, timeout, etc.).
/// - [`ScraperError::UnexpectedStatus`] with a 5xx status.
///
/// Everything else (404, other 4xx, malformed bodies) is returned immediately.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::Deserialize { .. }
        | ScraperError::NotFound { .. }
        | ScraperError::InvalidUrl { .. }
        | ScraperError::MalformedGeocode { .. } => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// The wait before the n-th retry is `backoff_base_secs * 2^(n-1)` seconds
/// with ±25 % jitter, capped at 60 s. With `max_retries = 2` the operation
/// is attempted at most 3 times. Non-retriable errors are returned at once.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_secs
                    .saturating_mul(1000)
                    .saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient request error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Enforces a minimum interval between consecutive requests.
///
/// The first call to [`RequestPacer::wait`] returns immediately; later calls
/// sleep until `min_interval` has passed since the previous one.
#[derive(Debug)]
pub struct RequestPacer {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl RequestPacer {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    pub async fn wait(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}
