//! Minimum observed duration for mutating calls.
//!
//! The front end flips a busy indicator around each add, update, delete and test.
//! When a call returns faster than a frame the indicator never renders, so every such
//! call is held open until at least [`DEFAULT_BUSY_FLOOR`] has passed.
//!
//! Clones share one floor, so a settings change reaches every holder.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::{Instant, sleep_until};

/// Default floor applied to mutating calls
pub const DEFAULT_BUSY_FLOOR: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct BusyFloor {
    min_ms: Arc<AtomicU64>,
}

impl BusyFloor {
    pub fn new(min: Duration) -> Self {
        Self {
            min_ms: Arc::new(AtomicU64::new(millis(min))),
        }
    }

    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms.load(Ordering::Relaxed))
    }

    /// Change the floor for this handle and every clone of it.
    pub fn set_min(&self, min: Duration) {
        self.min_ms.store(millis(min), Ordering::Relaxed);
    }

    /// Await `fut`, then wait out whatever remains of the floor.
    pub async fn hold<F: Future>(&self, fut: F) -> F::Output {
        let deadline = Instant::now().checked_add(self.min());
        let output = fut.await;
        if let Some(deadline) = deadline {
            sleep_until(deadline).await;
        }
        output
    }
}

impl Default for BusyFloor {
    fn default() -> Self {
        Self::new(DEFAULT_BUSY_FLOOR)
    }
}

fn millis(min: Duration) -> u64 {
    u64::try_from(min.as_millis()).unwrap_or(u64::MAX)
}
