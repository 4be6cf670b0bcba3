//! Clock trait abstraction for mocking time in tests.
//!
//! - `SystemClock`: delegates to real `tokio::time`
//! - `MockClock`: records requested sleeps and returns immediately

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

/// Abstraction over time, used by the retry loop to honor retry-after delays.
/// Implement this trait to control time in tests.
///
/// Boxed via `async_trait` because queue workers are spawned onto the runtime
/// and need `Send` futures from a generic clock.
#[async_trait]
pub trait Clock: Send + Sync + 'static {
    /// Sleep for the given duration (returns immediately in mock implementations).
    async fn sleep(&self, duration: Duration);
}

/// Live implementation: delegates to real tokio time.
#[derive(Clone, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Mock clock for unit tests.
/// - `sleep()` records the requested duration and returns immediately
/// - `slept()` returns every recorded duration in request order
#[derive(Clone, Default)]
pub struct MockClock {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a snapshot of all durations passed to `sleep`, in order.
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for MockClock {
    async fn sleep(&self, duration: Duration) {
        // No real delay: tests assert on the recorded durations instead.
        self.slept.lock().unwrap().push(duration);
    }
}
