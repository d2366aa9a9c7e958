use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};

pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
}

static SEC_API_RATE_LIMITER: OnceCell<RateLimiter> = OnceCell::new();

impl RateLimiter {
    pub fn new(max_concurrent: usize) -> Self {
        RateLimiter {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        self.semaphore
            .acquire()
            .await
            .map_err(|_| anyhow!("Rate limiter semaphore closed"))
    }

    /// Shared limiter for every request to the filing APIs.
    pub fn sec_api() -> &'static RateLimiter {
        SEC_API_RATE_LIMITER.get_or_init(RateLimiter::default)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(10) // SEC allows 10 requests per second
    }
}
