//! Monotonic time source for token buckets.
//!
//! Production code uses [`SystemClock`]. Tests drive refill arithmetic by
//! hand with [`MockClock`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> Instant {
        T::now(self)
    }
}

/// Manually advanced clock.
///
/// All clones read the same instant: hand one to the bucket, advance another.
#[derive(Debug, Clone)]
pub struct MockClock {
    origin: Instant,
    current: Arc<Mutex<Instant>>,
}

impl MockClock {
    pub fn new() -> Self {
        let origin = Instant::now();
        Self { origin, current: Arc::new(Mutex::new(origin)) }
    }

    pub fn advance(&self, by: Duration) {
        *self.current.lock() += by;
    }

    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Total time advanced since construction.
    pub fn elapsed(&self) -> Duration {
        self.current.lock().duration_since(self.origin)
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self.current.lock()
    }
}
