//! Ember node: everything the control interface needs at runtime.
//!
//! The node owns:
//! - configuration loaded from TOML ([`NodeConfig`])
//! - structured logging setup ([`init_logging`])
//! - the JSON ban-list file ([`JsonBanStore`])
//! - the in-process collaborators the built-in commands act on: the peer
//!   registry, the block index and the raw transaction codec
//! - the start/persist/stop lifecycle ([`EmberNode`])

pub mod ban_store;
pub mod config;
pub mod connection_registry;
pub mod error;
pub mod local_broadcaster;
pub mod local_chain;
pub mod logging;
pub mod node;
pub mod shutdown;
pub mod tx_codec;

pub use ban_store::JsonBanStore;
pub use config::NodeConfig;
pub use connection_registry::{ConnectionRegistry, PeerInfo, Refusal};
pub use error::NodeError;
pub use local_broadcaster::LocalBroadcaster;
pub use local_chain::MemoryChain;
pub use logging::{init_logging, LogFormat};
pub use node::EmberNode;
pub use shutdown::ShutdownController;
pub use tx_codec::{LegacyTxCodec, Transaction, TxDecodeError};
