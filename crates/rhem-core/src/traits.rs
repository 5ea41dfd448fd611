// crates/rhem-core/src/traits.rs

use std::sync::atomic::{AtomicU64, Ordering};

use crate::address::Timestamp;

/// Source of the current time (block-timestamp equivalent).
///
/// Core operations take `now` as an argument; the service layer reads the
/// clock exactly once per call and passes the value down.
pub trait Clock: Send + Sync {
    /// Current time in whole seconds since the Unix epoch.
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by chrono.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp().max(0) as Timestamp
    }
}

/// A clock that only moves when told to. Used by tests and by development
/// daemons started in manual-clock mode.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Move the clock forward by `seconds`. Returns the new time, or `None`
    /// (clock unchanged) if that would overflow.
    pub fn advance(&self, seconds: u64) -> Option<Timestamp> {
        self.now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| now.checked_add(seconds))
            .ok()
            .map(|previous| previous + seconds)
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
