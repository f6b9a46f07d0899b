//! State and collaborators the built-in commands operate on.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use ember_network::BanList;
use ember_types::{Amount, Clock, NetworkId, Timestamp};
use ipnet::IpNet;
use serde_json::Value;

use crate::error::RpcError;

/// Peer connection management.
pub trait PeerConnections: Send + Sync {
    fn is_network_active(&self) -> bool;

    fn set_network_active(&self, active: bool);

    fn connection_count(&self) -> usize;

    /// Drop connected peers inside `subnet`, returning how many.
    fn disconnect(&self, subnet: &IpNet) -> usize;
}

/// A block selected by height or by hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockRef {
    Height(u64),
    Hash(String),
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockRef::Height(h) => write!(f, "{h}"),
            BlockRef::Hash(hash) => f.write_str(hash),
        }
    }
}

/// Fee data of one non-generation transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxFeeSample {
    pub fee: Amount,
    pub weight: i64,
}

/// What block statistics are computed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockSummary {
    pub hash: String,
    pub height: u64,
    pub time: u64,
    pub transactions: Vec<TxFeeSample>,
}

/// Read access to the active chain.
pub trait ChainView: Send + Sync {
    fn tip_height(&self) -> Option<u64>;

    fn block(&self, target: &BlockRef) -> Option<BlockSummary>;
}

/// Raw transaction decoding and relay.
pub trait TransactionCodec: Send + Sync {
    /// Decode serialized transaction bytes into their JSON description.
    fn decode(&self, raw: &[u8], try_witness: bool) -> Result<Value, String>;

    /// Submit a transaction for relay and return its id.
    fn broadcast(&self, raw: &[u8], max_fee_rate: Amount) -> Result<String, RpcError>;
}

/// Fee settings reported by `getnetworkinfo`; `pay_tx_fee` is set by
/// `settxfee`.
#[derive(Debug)]
pub struct FeeSettings {
    min_relay_fee: Amount,
    pay_tx_fee: AtomicI64,
}

impl FeeSettings {
    pub fn new(min_relay_fee: Amount, pay_tx_fee: Amount) -> Self {
        Self {
            min_relay_fee,
            pay_tx_fee: AtomicI64::new(pay_tx_fee.units()),
        }
    }

    pub fn min_relay_fee(&self) -> Amount {
        self.min_relay_fee
    }

    pub fn pay_tx_fee(&self) -> Amount {
        Amount::from_units(self.pay_tx_fee.load(Ordering::Relaxed))
    }

    pub fn set_pay_tx_fee(&self, fee: Amount) {
        self.pay_tx_fee.store(fee.units(), Ordering::Relaxed);
    }
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self::new(Amount::from_units(10_000), Amount::ZERO)
    }
}

/// Everything a built-in command handler can reach.
pub struct NodeContext {
    pub network: NetworkId,
    pub banlist: Arc<BanList>,
    /// `None` when the node runs without peer-to-peer networking.
    pub connections: Option<Arc<dyn PeerConnections>>,
    pub chain: Arc<dyn ChainView>,
    pub transactions: Arc<dyn TransactionCodec>,
    pub clock: Arc<dyn Clock>,
    pub fees: FeeSettings,
    pub started_at: Timestamp,
}

impl NodeContext {
    pub fn new(
        network: NetworkId,
        banlist: Arc<BanList>,
        chain: Arc<dyn ChainView>,
        transactions: Arc<dyn TransactionCodec>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let started_at = clock.now();
        Self {
            network,
            banlist,
            connections: None,
            chain,
            transactions,
            clock,
            fees: FeeSettings::default(),
            started_at,
        }
    }

    pub fn with_connections(mut self, connections: Arc<dyn PeerConnections>) -> Self {
        self.connections = Some(connections);
        self
    }

    pub fn with_fees(mut self, fees: FeeSettings) -> Self {
        self.fees = fees;
        self
    }

    /// Peer connections, or the error for a node without networking.
    pub fn connections(&self) -> Result<&dyn PeerConnections, RpcError> {
        self.connections.as_deref().ok_or(RpcError::P2pDisabled)
    }
}
