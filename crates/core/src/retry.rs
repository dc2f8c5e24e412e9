//! Retrying transient remote failures
//!
//! Transports wrap single HTTP exchanges in [`retry_with_backoff`] so that
//! throttling (429) and short outages do not surface as errors. Gateway
//! operations never retry on their own.

use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::RemoteError;

/// Sleep durations between attempts
///
/// Starts at `initial_backoff_ms`, doubles after every attempt and never
/// exceeds `max_backoff_ms` before jitter. Yields one delay fewer than
/// `max_attempts`, so a config of one attempt never sleeps.
#[derive(Debug, Clone)]
pub struct Backoff {
    next_ms: u64,
    max_ms: u64,
    remaining: u32,
}

impl Backoff {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            next_ms: config.initial_backoff_ms,
            max_ms: config.max_backoff_ms,
            remaining: config.max_attempts.saturating_sub(1),
        }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let base_ms = self.next_ms.min(self.max_ms);
        self.next_ms = self.next_ms.saturating_mul(2);
        Some(Duration::from_millis(base_ms + jitter_ms(base_ms / 2)))
    }
}

/// Clock-derived jitter in `0..=max`
fn jitter_ms(max: u64) -> u64 {
    let nanos = u64::try_from(jiff::Timestamp::now().subsec_nanosecond()).unwrap_or(0);
    nanos % (max + 1)
}

/// Run `operation` until it succeeds, fails permanently or runs out of attempts
///
/// The last error is returned unchanged.
pub async fn retry_with_backoff<T, F, Fut, R>(
    config: &RetryConfig,
    mut operation: F,
    is_retryable: R,
) -> Result<T, RemoteError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
    R: Fn(&RemoteError) -> bool,
{
    let mut delays = Backoff::new(config);
    let mut attempt: u32 = 1;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retryable(&err) {
            return Err(err);
        }

        let Some(delay) = delays.next() else {
            tracing::warn!(attempts = attempt, error = %err, "Giving up after transient errors");
            return Err(err);
        };

        tracing::debug!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Transient remote error, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// Default retry predicate: throttling, 5xx and transport failures
pub fn is_retryable_error(error: &RemoteError) -> bool {
    error.is_transient()
}
