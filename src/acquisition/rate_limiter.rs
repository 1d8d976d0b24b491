//! Shared request rate limiter
//!
//! Every outbound request (search, probe, document download) holds a
//! [`RatePermit`] for its duration. At most `max_concurrent` permits are
//! outstanding at once, and a released slot only becomes reusable after the
//! cooldown period has elapsed. Taken together, no more than `max_concurrent`
//! requests start inside any window of one period.

use crate::config::EngineConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Limits concurrent requests and spaces slot reuse by a fixed period
#[derive(Debug)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    period: Duration,
}

/// An acquired request slot
///
/// Dropping the permit schedules the slot's release after the limiter's
/// period, so the release happens on every exit path including errors.
#[derive(Debug)]
pub struct RatePermit {
    permit: Option<OwnedSemaphorePermit>,
    period: Duration,
}

impl RateLimiter {
    /// Creates a limiter allowing `max_concurrent` requests per `period`
    ///
    /// A zero `max_concurrent` is treated as one.
    pub fn new(max_concurrent: usize, period: Duration) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            period,
        }
    }

    /// Creates a limiter from the engine settings
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.max_concurrent_requests as usize, config.rate_period())
    }

    /// Waits for a free slot
    pub async fn acquire(&self) -> RatePermit {
        let permit = match self.semaphore.clone().acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(_) => {
                // Only happens if the semaphore is closed, which this type never does
                tracing::warn!("Rate limiter closed, proceeding without a permit");
                None
            }
        };

        tracing::trace!("Acquired request slot ({} free)", self.available());
        RatePermit {
            permit,
            period: self.period,
        }
    }

    /// Number of slots that can be acquired right now
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for RatePermit {
    fn drop(&mut self) {
        let Some(permit) = self.permit.take() else {
            return;
        };

        if self.period.is_zero() {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let period = self.period;
                tracing::trace!("Request slot cools down for {:?}", period);
                handle.spawn(async move {
                    tokio::time::sleep(period).await;
                    drop(permit);
                });
            }
            // Outside a runtime there is nothing to sleep on; release now
            Err(_) => drop(permit),
        }
    }
}
