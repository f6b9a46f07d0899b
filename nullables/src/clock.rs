//! Controllable clock for ban-expiry and uptime tests.

use ember_types::{Clock, Timestamp};
use std::sync::atomic::{AtomicU64, Ordering};

/// Clock whose time moves only through [`NullClock::advance`] and
/// [`NullClock::set`]. Atomic, so one instance can sit behind the
/// `Arc<dyn Clock>` the ban list and the rpc context share.
#[derive(Debug)]
pub struct NullClock {
    current: AtomicU64,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: AtomicU64::new(initial_secs),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.load(Ordering::SeqCst))
    }

    /// Move forward by `secs`.
    pub fn advance(&self, secs: u64) {
        self.current.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn set(&self, secs: u64) {
        self.current.store(secs, Ordering::SeqCst);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        NullClock::now(self)
    }
}
