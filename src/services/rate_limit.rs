use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Public Nominatim allows one request per second; keep a margin.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(1100);

/// Spaces calls at least `min_interval` apart.
///
/// Waiting callers queue on a fair mutex, so they run in arrival order and are delayed rather
/// than dropped. [`RateGate::shared`] is one gate for the whole process, used by every
/// geocoder that does not bring its own.
#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateGate {
    /// Private gate; most callers want [`RateGate::shared`].
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// The process-wide gate at [`MIN_REQUEST_INTERVAL`].
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<RateGate>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(RateGate::new(MIN_REQUEST_INTERVAL)))
            .clone()
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait for the slot, record it as taken, then run `call`.
    pub async fn wait_then_call<F, Fut, T>(&self, call: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        {
            let mut last = self.last_call.lock().await;
            if let Some(prev) = *last {
                let ready = prev + self.min_interval;
                if Instant::now() < ready {
                    tracing::debug!(wait_ms = (ready - Instant::now()).as_millis() as u64, "rate gate delaying call");
                    tokio::time::sleep_until(ready).await;
                }
            }
            *last = Some(Instant::now());
        }
        call().await
    }
}

#[cfg(test)]
#[path = "../../tests/unit/services/rate_limit.rs"]
mod tests;
