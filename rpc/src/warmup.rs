//! Startup gate for the dispatcher.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub const DEFAULT_WARMUP_STATUS: &str = "Loading...";

/// Methods callable while the node is still warming up.
pub const DEFAULT_WARMUP_ALLOWED: &[&str] = &["help", "uptime"];

/// One-way `WarmingUp -> Ready` flag plus the status text reported to
/// callers that arrive too early.
#[derive(Debug)]
pub struct WarmupState {
    ready: AtomicBool,
    status: Mutex<String>,
}

impl Default for WarmupState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            status: Mutex::new(DEFAULT_WARMUP_STATUS.to_string()),
        }
    }
}

impl WarmupState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Leave warm-up. Later calls are no-ops.
    pub fn mark_ready(&self) {
        if !self.ready.swap(true, Ordering::AcqRel) {
            tracing::info!("rpc warm-up finished");
        }
    }

    pub fn set_status(&self, status: impl Into<String>) {
        let status = status.into();
        tracing::debug!(status = %status, "warm-up status");
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = status;
    }

    pub fn status(&self) -> String {
        self.status.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
