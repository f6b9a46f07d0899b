//! Connection registry: the set of connected peers.
//!
//! Shared between whatever accepts peer connections (which registers them)
//! and the control interface (which counts, disconnects and switches the
//! network on and off). Admission is refused for banned addresses and while
//! the network is inactive.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard};

use ember_network::{BanList, NetworkActivity};
use ember_rpc::PeerConnections;
use ember_types::{Clock, Timestamp};
use ipnet::IpNet;

/// Why a peer was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    Banned,
    NetworkInactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerInfo {
    pub addr: SocketAddr,
    pub connected_at: Timestamp,
}

/// Registry of connected peers keyed by socket address.
pub struct ConnectionRegistry {
    peers: Mutex<HashMap<SocketAddr, PeerInfo>>,
    activity: NetworkActivity,
    banlist: Arc<BanList>,
    clock: Arc<dyn Clock>,
}

impl ConnectionRegistry {
    pub fn new(banlist: Arc<BanList>, clock: Arc<dyn Clock>, active: bool) -> Self {
        Self {
            peers: Mutex::new(HashMap::new()),
            activity: NetworkActivity::new(active),
            banlist,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SocketAddr, PeerInfo>> {
        self.peers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Admit a peer. A repeated address replaces the earlier record.
    pub fn register(&self, addr: SocketAddr) -> Result<(), Refusal> {
        if !self.activity.is_active() {
            return Err(Refusal::NetworkInactive);
        }
        if self.banlist.is_banned(addr.ip()) {
            tracing::debug!(peer = %addr, "refusing banned peer");
            return Err(Refusal::Banned);
        }
        let info = PeerInfo {
            addr,
            connected_at: self.clock.now(),
        };
        self.lock().insert(addr, info);
        tracing::debug!(peer = %addr, "peer registered");
        Ok(())
    }

    /// Forget a peer, returning its record if it was connected.
    pub fn remove(&self, addr: &SocketAddr) -> Option<PeerInfo> {
        self.lock().remove(addr)
    }

    pub fn is_connected(&self, ip: IpAddr) -> bool {
        self.lock().keys().any(|addr| addr.ip() == ip)
    }

    /// Snapshot of the connected peers, ordered by address.
    pub fn peers(&self) -> Vec<PeerInfo> {
        let mut peers: Vec<PeerInfo> = self.lock().values().copied().collect();
        peers.sort_by_key(|p| p.addr);
        peers
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl PeerConnections for ConnectionRegistry {
    fn is_network_active(&self) -> bool {
        self.activity.is_active()
    }

    fn set_network_active(&self, active: bool) {
        if self.activity.set_active(active) && !active {
            let dropped = {
                let mut peers = self.lock();
                let n = peers.len();
                peers.clear();
                n
            };
            tracing::info!(dropped, "network disabled, peers disconnected");
        }
    }

    fn connection_count(&self) -> usize {
        self.len()
    }

    fn disconnect(&self, subnet: &IpNet) -> usize {
        let mut peers = self.lock();
        let before = peers.len();
        peers.retain(|addr, _| !subnet.contains(&addr.ip()));
        let dropped = before - peers.len();
        if dropped > 0 {
            tracing::debug!(subnet = %subnet, dropped, "peers in subnet dropped");
        }
        dropped
    }
}
