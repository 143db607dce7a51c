//! Process-wide pacing for outbound geocoding requests.
//!
//! Public geocoders (Nominatim in particular) allow roughly one request per
//! second per client. A single [`RateLimiter`] is shared by every caller so
//! the cap holds globally, not per call site: concurrent `acquire` calls queue
//! on the mutex and are released one `min_interval` apart.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// A limiter that never waits. Intended for tests against local mocks.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until at least `min_interval` has passed since the previous
    /// granted slot, then claims the slot.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let next_slot = previous + self.min_interval;
            if next_slot > Instant::now() {
                tokio::time::sleep_until(next_slot).await;
            }
        }
        *last = Some(Instant::now());
    }
}
