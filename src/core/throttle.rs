use crate::domain::ports::RateLimiter;
use async_trait::async_trait;
use std::time::Duration;

/// Sleeps a fixed amount after every request.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl RateLimiter for FixedDelay {
    async fn wait(&self) {
        if !self.delay.is_zero() {
            tracing::debug!("Waiting {:?} before next request", self.delay);
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// No pacing at all; for tests and replayed responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl RateLimiter for NoDelay {
    async fn wait(&self) {}
}
