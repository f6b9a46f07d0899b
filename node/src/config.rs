//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use ember_network::banlist::DEFAULT_BAN_SECS;
use ember_rpc::warmup::DEFAULT_WARMUP_ALLOWED;
use ember_types::{Amount, NetworkId};

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for an Ember node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Which network the node belongs to.
    #[serde(default)]
    pub network: NetworkId,

    /// Directory holding the ban list and other node state.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether peer-to-peer networking starts enabled.
    #[serde(default = "default_true")]
    pub network_active: bool,

    /// Ban list file name inside `data_dir`.
    #[serde(default = "default_ban_file_name")]
    pub ban_file_name: String,

    /// Ban length in seconds when `setban` gives none. Zero bans forever.
    #[serde(default = "default_ban_time_secs")]
    pub default_ban_time_secs: u64,

    /// Commands served while the node is still starting.
    #[serde(default = "default_warmup_allowed_methods")]
    pub warmup_allowed_methods: Vec<String>,

    /// Minimum relay fee per kilobyte, as amount text.
    #[serde(default = "default_min_relay_fee")]
    pub min_relay_fee: String,

    /// Wallet fee per kilobyte, as amount text. Zero selects fees
    /// automatically.
    #[serde(default = "default_pay_tx_fee")]
    pub pay_tx_fee: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./ember_data")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_ban_file_name() -> String {
    "banlist.json".to_string()
}

fn default_ban_time_secs() -> u64 {
    DEFAULT_BAN_SECS
}

fn default_warmup_allowed_methods() -> Vec<String> {
    DEFAULT_WARMUP_ALLOWED.iter().map(|s| s.to_string()).collect()
}

fn default_min_relay_fee() -> String {
    "0.010000".to_string()
}

fn default_pay_tx_fee() -> String {
    "0.000000".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(format!("{path}: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn ban_file_path(&self) -> PathBuf {
        self.data_dir.join(&self.ban_file_name)
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }

    pub fn min_relay_fee(&self) -> Result<Amount, NodeError> {
        parse_fee("min_relay_fee", &self.min_relay_fee)
    }

    pub fn pay_tx_fee(&self) -> Result<Amount, NodeError> {
        parse_fee("pay_tx_fee", &self.pay_tx_fee)
    }

    /// Check every field that has a restricted format.
    pub fn validate(&self) -> Result<(), NodeError> {
        self.log_format()?;
        self.min_relay_fee()?;
        self.pay_tx_fee()?;
        if self.ban_file_name.is_empty() || self.ban_file_name.contains(['/', '\\']) {
            return Err(NodeError::Config(format!(
                "ban_file_name must be a plain file name, got {:?}",
                self.ban_file_name
            )));
        }
        Ok(())
    }
}

fn parse_fee(field: &str, text: &str) -> Result<Amount, NodeError> {
    Amount::parse(text)
        .and_then(Amount::checked_money)
        .map_err(|e| NodeError::Config(format!("{field}: {e}")))
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network: NetworkId::default(),
            data_dir: default_data_dir(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            network_active: default_true(),
            ban_file_name: default_ban_file_name(),
            default_ban_time_secs: default_ban_time_secs(),
            warmup_allowed_methods: default_warmup_allowed_methods(),
            min_relay_fee: default_min_relay_fee(),
            pay_tx_fee: default_pay_tx_fee(),
        }
    }
}
