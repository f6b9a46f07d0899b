//! Operator-managed ban list of IP subnets.
//!
//! Entries are keyed by canonical subnet and never nest: a subnet already
//! covered by an entry cannot be added, and adding a subnet that covers
//! existing entries absorbs them. Expired entries stay in the map (and keep
//! blocking re-adds of what they cover) until [`BanList::remove`] or
//! [`BanList::clear`] drops them; they are only hidden from
//! [`BanList::list`] and ignored by [`BanList::is_banned`]. Persisting and
//! reloading keeps them.
//!
//! A single mutex guards the whole map. Every operation is linear in the
//! number of entries, which stays small for manual bans.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use ember_types::{Clock, Timestamp};
use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::error::NetworkError;

/// Default ban length when none is given: 24 hours.
pub const DEFAULT_BAN_SECS: u64 = 24 * 60 * 60;

/// A persisted ban record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanEntry {
    pub subnet: IpNet,
    pub created_at: Timestamp,
    /// `None` means the ban never expires.
    pub expires_at: Option<Timestamp>,
}

impl BanEntry {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|until| now >= until)
    }
}

/// One row of [`BanList::list`], with durations resolved against "now".
///
/// Time fields are `None` for bans that never expire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BanListing {
    pub address: String,
    pub ban_created: u64,
    pub banned_until: Option<u64>,
    pub ban_duration: Option<u64>,
    pub time_remaining: Option<u64>,
}

#[derive(Debug, Default)]
struct BanState {
    entries: BTreeMap<IpNet, BanEntry>,
    dirty: bool,
}

/// The set of banned subnets, shared by the RPC handlers and the connection
/// manager.
pub struct BanList {
    clock: Arc<dyn Clock>,
    /// Ban length applied when a caller passes zero; zero here means "never".
    default_ban_secs: u64,
    state: Mutex<BanState>,
}

impl BanList {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_default_ban(clock, DEFAULT_BAN_SECS)
    }

    pub fn with_default_ban(clock: Arc<dyn Clock>, default_ban_secs: u64) -> Self {
        Self {
            clock,
            default_ban_secs,
            state: Mutex::new(BanState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BanState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Ban `subnet`.
    ///
    /// With `absolute` set, `bantime` is the Unix time the ban ends; otherwise
    /// it is a duration from now. A `bantime` of zero applies the default ban
    /// length as a duration.
    pub fn add(&self, subnet: IpNet, bantime: u64, absolute: bool) -> Result<BanEntry, NetworkError> {
        let now = self.clock.now();
        let expires_at = if bantime == 0 {
            (self.default_ban_secs > 0).then(|| now.saturating_add(self.default_ban_secs))
        } else if absolute {
            if bantime < now.as_secs() {
                return Err(NetworkError::BanTimeInPast {
                    until: bantime,
                    now: now.as_secs(),
                });
            }
            Some(Timestamp::new(bantime))
        } else {
            Some(now.saturating_add(bantime))
        };

        let entry = BanEntry {
            subnet,
            created_at: now,
            expires_at,
        };

        let mut state = self.lock();
        if let Some(covering) = state.entries.keys().find(|net| net.contains(&subnet)) {
            tracing::debug!(subnet = %subnet, covering = %covering, "ban rejected, already covered");
            return Err(NetworkError::AlreadyBanned(subnet));
        }

        let absorbed: Vec<IpNet> = state
            .entries
            .keys()
            .filter(|net| subnet.contains(*net))
            .copied()
            .collect();
        for net in absorbed {
            state.entries.remove(&net);
            tracing::debug!(absorbed = %net, by = %subnet, "narrower ban absorbed");
        }

        state.entries.insert(subnet, entry.clone());
        state.dirty = true;
        tracing::info!(
            subnet = %subnet,
            until = ?expires_at.map(|t| t.as_secs()),
            "subnet banned"
        );
        Ok(entry)
    }

    /// Lift the ban on exactly `subnet`. Containment does not count: removing
    /// a single host inside a banned range fails.
    pub fn remove(&self, subnet: &IpNet) -> Result<BanEntry, NetworkError> {
        let mut state = self.lock();
        let entry = state
            .entries
            .remove(subnet)
            .ok_or(NetworkError::NotBanned(*subnet))?;
        state.dirty = true;
        tracing::info!(subnet = %subnet, "subnet unbanned");
        Ok(entry)
    }

    /// Drop every entry, expired or not.
    pub fn clear(&self) {
        let mut state = self.lock();
        let count = state.entries.len();
        state.entries.clear();
        state.dirty = true;
        tracing::info!(count, "ban list cleared");
    }

    /// Active entries in subnet order.
    pub fn list(&self) -> Vec<BanListing> {
        let now = self.clock.now();
        self.lock()
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| {
                let until = entry.expires_at.map(|t| t.as_secs());
                BanListing {
                    address: entry.subnet.to_string(),
                    ban_created: entry.created_at.as_secs(),
                    banned_until: until,
                    ban_duration: until.map(|u| u.saturating_sub(entry.created_at.as_secs())),
                    time_remaining: entry.expires_at.map(|t| t.remaining_from(now)),
                }
            })
            .collect()
    }

    /// Whether an active ban covers `addr`.
    pub fn is_banned(&self, addr: IpAddr) -> bool {
        let now = self.clock.now();
        self.lock()
            .entries
            .values()
            .any(|entry| !entry.is_expired(now) && entry.subnet.contains(&addr))
    }

    /// Replace the contents with previously persisted entries.
    ///
    /// Entries nested inside an earlier one are skipped so the list keeps its
    /// non-nesting shape even if the store was edited by hand. Expired
    /// entries are kept like any other. Returns the number of entries kept.
    pub fn load(&self, entries: Vec<BanEntry>) -> usize {
        let mut state = self.lock();
        state.entries.clear();

        let mut sorted = entries;
        sorted.sort_by_key(|entry| entry.subnet.prefix_len());
        for entry in sorted {
            if state.entries.keys().any(|net| net.contains(&entry.subnet)) {
                tracing::warn!(subnet = %entry.subnet, "skipping nested ban entry from store");
                continue;
            }
            state.entries.insert(entry.subnet, entry);
        }
        state.dirty = false;
        let kept = state.entries.len();
        tracing::info!(count = kept, "ban list loaded");
        kept
    }

    /// Snapshot of every stored entry, expired ones included.
    pub fn entries(&self) -> Vec<BanEntry> {
        self.lock().entries.values().cloned().collect()
    }

    /// Report whether the list changed since the last call, and reset.
    pub fn take_dirty(&self) -> bool {
        std::mem::take(&mut self.lock().dirty)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
