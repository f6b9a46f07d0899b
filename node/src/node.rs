//! The Ember node: wires the ban list, peer registry, chain index and
//! transaction codec behind the command dispatcher.
//!
//! Lifecycle: [`EmberNode::new`] builds everything with the dispatcher in
//! warm-up, [`EmberNode::start`] loads persisted bans and opens the gate,
//! [`EmberNode::persist_bans`] writes the list back when it changed, and
//! [`EmberNode::stop`] does a final write.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ember_network::{BanList, BanStore};
use ember_rpc::{
    register_all, CommandTable, Dispatcher, FeeSettings, NodeContext, Request, RpcServer,
    WarmupState,
};
use ember_types::{Clock, SystemClock};
use ember_utils::format_duration;
use serde_json::Value;

use crate::ban_store::JsonBanStore;
use crate::config::NodeConfig;
use crate::connection_registry::ConnectionRegistry;
use crate::error::NodeError;
use crate::local_chain::MemoryChain;
use crate::tx_codec::LegacyTxCodec;

pub struct EmberNode {
    config: NodeConfig,
    banlist: Arc<BanList>,
    store: Arc<dyn BanStore>,
    connections: Arc<ConnectionRegistry>,
    chain: Arc<MemoryChain>,
    codec: Arc<LegacyTxCodec>,
    server: RpcServer<NodeContext>,
    started: AtomicBool,
    /// Set when a save failed, so the next persist retries even though the
    /// ban list's dirty flag was already taken.
    persist_pending: AtomicBool,
}

impl EmberNode {
    /// Build a node on the system clock with the ban list stored under
    /// `config.data_dir`.
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        let store = Arc::new(JsonBanStore::new(config.ban_file_path()));
        Self::with_parts(config, Arc::new(SystemClock), store)
    }

    /// Build a node from explicit collaborators.
    pub fn with_parts(
        config: NodeConfig,
        clock: Arc<dyn Clock>,
        store: Arc<dyn BanStore>,
    ) -> Result<Self, NodeError> {
        config.validate()?;

        let banlist = Arc::new(BanList::with_default_ban(
            clock.clone(),
            config.default_ban_time_secs,
        ));
        let connections = Arc::new(ConnectionRegistry::new(
            banlist.clone(),
            clock.clone(),
            config.network_active,
        ));
        let chain = Arc::new(MemoryChain::new());
        let codec = Arc::new(LegacyTxCodec::new(connections.clone(), clock.clone()));
        let fees = FeeSettings::new(config.min_relay_fee()?, config.pay_tx_fee()?);

        let context = NodeContext::new(
            config.network,
            banlist.clone(),
            chain.clone(),
            codec.clone(),
            clock,
        )
        .with_connections(connections.clone())
        .with_fees(fees);

        let mut table = CommandTable::new();
        register_all(&mut table)?;
        let dispatcher = Dispatcher::new(table, Arc::new(WarmupState::new()))
            .with_warmup_allowed(config.warmup_allowed_methods.iter().cloned());
        let server = RpcServer::new(Arc::new(dispatcher), Arc::new(context));

        tracing::info!(
            network = %config.network.as_str(),
            commands = server.dispatcher().table().len(),
            "node created"
        );

        Ok(Self {
            config,
            banlist,
            store,
            connections,
            chain,
            codec,
            server,
            started: AtomicBool::new(false),
            persist_pending: AtomicBool::new(false),
        })
    }

    /// Load persisted bans and leave warm-up.
    pub fn start(&self) -> Result<(), NodeError> {
        let warmup = self.warmup();
        warmup.set_status("Loading banlist...");
        let entries = self.store.load()?;
        let kept = self.banlist.load(entries);
        warmup.set_status("Done loading");
        warmup.mark_ready();
        self.started.store(true, Ordering::Release);
        tracing::info!(bans = kept, "node started");
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Save the ban list if it changed since the last save. Expired entries
    /// are written too. Returns whether a save happened.
    pub fn persist_bans(&self) -> Result<bool, NodeError> {
        if !self.is_started() {
            return Err(NodeError::NotStarted);
        }
        let dirty = self.banlist.take_dirty();
        if !dirty && !self.persist_pending.swap(false, Ordering::AcqRel) {
            return Ok(false);
        }
        if let Err(e) = self.store.save(&self.banlist.entries()) {
            self.persist_pending.store(true, Ordering::Release);
            tracing::warn!(error = %e, "failed to save ban list");
            return Err(e.into());
        }
        Ok(true)
    }

    /// Final save before exit. A node that never started has nothing to
    /// write.
    pub fn stop(&self) -> Result<(), NodeError> {
        if !self.started.swap(false, Ordering::AcqRel) {
            return Ok(());
        }
        self.banlist.take_dirty();
        self.store.save(&self.banlist.entries())?;
        let context = self.server.context();
        let uptime = context.started_at.elapsed_since(context.clock.now());
        tracing::info!(
            bans = self.banlist.len(),
            uptime = %format_duration(uptime),
            "node stopped"
        );
        Ok(())
    }

    pub fn execute(&self, request: &Request) -> Result<Value, ember_rpc::RpcError> {
        self.server.execute(request)
    }

    /// Handle one JSON-RPC request body (single or batch).
    pub fn handle_request_text(&self, body: &str) -> String {
        self.server.handle_request_text(body)
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn banlist(&self) -> &Arc<BanList> {
        &self.banlist
    }

    pub fn connections(&self) -> &Arc<ConnectionRegistry> {
        &self.connections
    }

    pub fn chain(&self) -> &Arc<MemoryChain> {
        &self.chain
    }

    pub fn codec(&self) -> &Arc<LegacyTxCodec> {
        &self.codec
    }

    pub fn warmup(&self) -> &Arc<WarmupState> {
        self.server.dispatcher().warmup()
    }

    pub fn server(&self) -> &RpcServer<NodeContext> {
        &self.server
    }
}
