//! Persistence seam for the ban list.
//!
//! The on-disk encoding belongs to the storage layer; the ban list only hands
//! over and receives plain [`BanEntry`] records.

use std::sync::Mutex;

use crate::banlist::BanEntry;
use crate::error::NetworkError;

/// Loads and saves the ban list at process start and stop.
pub trait BanStore: Send + Sync {
    /// Read every persisted entry. A store that has never been written
    /// returns an empty list.
    fn load(&self) -> Result<Vec<BanEntry>, NetworkError>;

    /// Replace the persisted entries.
    fn save(&self, entries: &[BanEntry]) -> Result<(), NetworkError>;
}

/// In-memory store, for tests and nodes run without a data directory.
#[derive(Debug, Default)]
pub struct MemoryBanStore {
    entries: Mutex<Vec<BanEntry>>,
}

impl MemoryBanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<BanEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl BanStore for MemoryBanStore {
    fn load(&self) -> Result<Vec<BanEntry>, NetworkError> {
        Ok(self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, entries: &[BanEntry]) -> Result<(), NetworkError> {
        *self.entries.lock().unwrap_or_else(|e| e.into_inner()) = entries.to_vec();
        Ok(())
    }
}
