//! Chat-completion client and the backoff helper shared by the LLM-backed steps.

pub mod client;
pub mod retry;

pub use client::ChatCompletionsClient;
pub use retry::{call_with_backoff, RetryPolicy, Sleeper, TokioSleeper};

use crate::error::Result;
use async_trait::async_trait;

/// Anything that can turn a single user prompt into a completion text.
///
/// The resolver and the metric cross-check only depend on this trait, so tests
/// drive them with scripted responses instead of the network.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String>;
}
