//! Injectable time source.
//!
//! Expiry checks and cache TTLs compare against a [`Clock`] handed in at
//! construction rather than reading the system time inline, so tests can
//! advance time deterministically. Production wiring uses [`SystemClock`].

use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A source of "now".
pub trait Clock: fmt::Debug + Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> SystemTime;

    /// Current time as whole seconds since the Unix epoch.
    ///
    /// A reading before the epoch saturates to zero.
    fn unix_seconds(&self) -> u64 {
        self.now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs())
    }
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A hand-advanced clock for deterministic tests.
///
/// Clones share the same instant; advancing one advances all of them.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<SystemTime>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Arc::new(RwLock::new(start)),
        }
    }

    /// Move the clock forward by `step`.
    pub fn advance(&self, step: Duration) {
        let mut now = self.now.write().expect("clock lock poisoned");
        *now += step;
    }

    /// Jump the clock to an absolute instant, forwards or backwards.
    pub fn set(&self, instant: SystemTime) {
        *self.now.write().expect("clock lock poisoned") = instant;
    }
}

impl Default for ManualClock {
    /// A clock frozen at the current system time.
    fn default() -> Self {
        Self::new(SystemTime::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.read().expect("clock lock poisoned")
    }
}
