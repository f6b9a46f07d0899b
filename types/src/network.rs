//! Network identifier.

use serde::{Deserialize, Serialize};

/// Identifies which chain a node is serving.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// The production network.
    #[default]
    Main,
    /// The public test network.
    Test,
    /// Local regression-test network.
    Regtest,
}

impl NetworkId {
    /// Default P2P port for this network.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Main => 9901,
            Self::Test => 9903,
            Self::Regtest => 18444,
        }
    }

    /// Default RPC port for this network.
    pub fn default_rpc_port(&self) -> u16 {
        match self {
            Self::Main => 9902,
            Self::Test => 9904,
            Self::Regtest => 18443,
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Test => "test",
            Self::Regtest => "regtest",
        }
    }
}

impl std::str::FromStr for NetworkId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Ok(Self::Main),
            "test" | "testnet" => Ok(Self::Test),
            "regtest" => Ok(Self::Regtest),
            other => Err(format!("unknown network: {other}")),
        }
    }
}
