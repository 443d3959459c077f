//! Request pacing for the batch driver.

use crate::llm::Sleeper;
use async_trait::async_trait;
use std::time::Duration;

/// Called by the batch loop before the request for record `index`.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn before_request(&self, index: usize);
}

/// Pauses for `pause` before every `every`-th request (never before the first).
pub struct FixedIntervalPacer<'a> {
    every: usize,
    pause: Duration,
    sleeper: &'a dyn Sleeper,
}

impl<'a> FixedIntervalPacer<'a> {
    pub fn new(every: usize, pause: Duration, sleeper: &'a dyn Sleeper) -> Self {
        Self {
            every: every.max(1),
            pause,
            sleeper,
        }
    }
}

#[async_trait]
impl<'a> Pacer for FixedIntervalPacer<'a> {
    async fn before_request(&self, index: usize) {
        if index > 0 && index % self.every == 0 {
            log::info!(
                "Pausing for {:?} to respect rate limits ({} requests sent)",
                self.pause,
                index
            );
            self.sleeper.sleep(self.pause).await;
        }
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn before_request(&self, _index: usize) {}
}
