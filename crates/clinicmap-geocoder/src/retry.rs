//! Retry with exponential back-off and jitter for geocoding requests.
//!
//! Only transient failures are retried: timeouts, connection failures, 429
//! and 5xx. A malformed body or a 4xx will look the same on the next attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::GeocodeError;

const MAX_DELAY_MS: u64 = 30_000;

pub(crate) fn is_retriable(err: &GeocodeError) -> bool {
    match err {
        GeocodeError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        GeocodeError::RateLimited { .. } => true,
        GeocodeError::UnexpectedStatus { status, .. } => *status >= 500,
        GeocodeError::Deserialize { .. }
        | GeocodeError::InvalidResponse(_)
        | GeocodeError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The wait before retry `n` is `backoff_base_ms × 2ⁿ⁻¹ ± 25 %`, capped at 30 s.
/// A 429 carrying `Retry-After` waits at least that long.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, GeocodeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GeocodeError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                let delay_ms = match &err {
                    GeocodeError::RateLimited { retry_after_secs } => {
                        jittered.max(retry_after_secs.saturating_mul(1000).min(MAX_DELAY_MS))
                    }
                    _ => jittered,
                };
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "geocoder transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
