//! Switch for peer-to-peer activity.

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether the node makes and accepts peer connections.
#[derive(Debug)]
pub struct NetworkActivity {
    active: AtomicBool,
}

impl NetworkActivity {
    pub fn new(active: bool) -> Self {
        Self {
            active: AtomicBool::new(active),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Set the state. Returns `true` when it changed.
    pub fn set_active(&self, active: bool) -> bool {
        let changed = self.active.swap(active, Ordering::AcqRel) != active;
        if changed {
            tracing::info!(active, "network activity changed");
        }
        changed
    }
}

impl Default for NetworkActivity {
    fn default() -> Self {
        Self::new(true)
    }
}
