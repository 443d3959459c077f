//! Exponential backoff around a fallible async call.

use crate::error::{Result, SchemalignError};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// How often and how patiently to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `max_retries + 1` attempts in total.
    pub max_retries: usize,
    /// First backoff; doubled after every retry.
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Source of delays, injected so tests can observe backoff without waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Run `op` until it succeeds, fails with an error `is_retryable` rejects, or the
/// retry budget is spent. The last error is returned unchanged.
///
/// `op` receives the zero-based attempt number.
pub async fn call_with_backoff<T, F, Fut, P>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    is_retryable: P,
    mut op: F,
) -> Result<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&SchemalignError) -> bool,
{
    let mut attempt = 0;
    let mut delay = policy.initial_delay;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_retries && is_retryable(&e) => {
                log::warn!(
                    "Attempt {}/{} failed: {}. Waiting {:?} before retrying...",
                    attempt + 1,
                    policy.max_retries + 1,
                    e,
                    delay
                );
                sleeper.sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(e) => {
                if is_retryable(&e) {
                    log::error!("Maximum number of attempts reached: {}", e);
                }
                return Err(e);
            }
        }
    }
}
