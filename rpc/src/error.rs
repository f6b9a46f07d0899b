//! RPC error types.
//!
//! Every failure that reaches a caller carries a stable numeric code and a
//! message. Codes follow the numbering operators' tooling already expects from
//! Bitcoin-family nodes.

use ember_network::NetworkError;
use ember_types::AmountError;
use serde_json::{json, Value};
use thiserror::Error;

/// Standard JSON-RPC 2.0 errors.
pub const RPC_INVALID_REQUEST: i32 = -32600;
pub const RPC_METHOD_NOT_FOUND: i32 = -32601;
pub const RPC_INTERNAL_ERROR: i32 = -32603;
pub const RPC_PARSE_ERROR: i32 = -32700;

/// General application errors.
pub const RPC_MISC_ERROR: i32 = -1;
pub const RPC_TYPE_ERROR: i32 = -3;
pub const RPC_INVALID_ADDRESS_OR_KEY: i32 = -5;
pub const RPC_INVALID_PARAMETER: i32 = -8;
pub const RPC_DESERIALIZATION_ERROR: i32 = -22;
pub const RPC_VERIFY_REJECTED: i32 = -26;
pub const RPC_IN_WARMUP: i32 = -28;

/// P2P client errors.
pub const RPC_CLIENT_P2P_DISABLED: i32 = -9;
pub const RPC_CLIENT_NODE_ALREADY_ADDED: i32 = -23;
pub const RPC_CLIENT_INVALID_IP_OR_SUBNET: i32 = -30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("Method not found")]
    UnknownMethod(String),

    /// The node is still starting; the message is the current warm-up status.
    #[error("{0}")]
    NotReady(String),

    #[error("Command {0} already registered")]
    DuplicateCommand(String),

    #[error("Unknown named parameter {0}")]
    UnknownNamedParameter(String),

    #[error("Parameter {0} specified multiple times")]
    DuplicateNamedParameter(String),

    #[error("Parameter {0} specified twice both as positional and named argument")]
    PositionalNamedOverlap(String),

    #[error("Error: IP/Subnet already banned")]
    AlreadyBanned,

    #[error("Error: Unban failed. Requested address/subnet was not previously manually banned.")]
    NotFound,

    #[error("Error: Invalid IP/Subnet")]
    InvalidSubnet,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Amount out of range")]
    AmountOutOfRange,

    #[error("{0}")]
    Type(String),

    #[error("{0}")]
    InvalidParameter(String),

    #[error("{0}")]
    InvalidAddressOrKey(String),

    #[error("{0}")]
    Deserialization(String),

    #[error("{0}")]
    VerifyRejected(String),

    #[error("Error: Peer-to-peer functionality missing or disabled")]
    P2pDisabled,

    /// Wrong number of arguments; the message is the command's usage line.
    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    Misc(String),

    #[error("Parse error")]
    Parse(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Internal(String),

    /// A handler failure, tagged with the command that raised it.
    #[error("{source}")]
    Command {
        method: String,
        source: Box<RpcError>,
    },
}

impl RpcError {
    pub fn code(&self) -> i32 {
        match self {
            RpcError::UnknownMethod(_) => RPC_METHOD_NOT_FOUND,
            RpcError::NotReady(_) => RPC_IN_WARMUP,
            RpcError::DuplicateCommand(_) | RpcError::Usage(_) | RpcError::Misc(_) => {
                RPC_MISC_ERROR
            }
            RpcError::UnknownNamedParameter(_)
            | RpcError::DuplicateNamedParameter(_)
            | RpcError::PositionalNamedOverlap(_)
            | RpcError::InvalidParameter(_) => RPC_INVALID_PARAMETER,
            RpcError::AlreadyBanned => RPC_CLIENT_NODE_ALREADY_ADDED,
            RpcError::NotFound | RpcError::InvalidSubnet => RPC_CLIENT_INVALID_IP_OR_SUBNET,
            RpcError::InvalidAmount | RpcError::AmountOutOfRange | RpcError::Type(_) => {
                RPC_TYPE_ERROR
            }
            RpcError::InvalidAddressOrKey(_) => RPC_INVALID_ADDRESS_OR_KEY,
            RpcError::Deserialization(_) => RPC_DESERIALIZATION_ERROR,
            RpcError::VerifyRejected(_) => RPC_VERIFY_REJECTED,
            RpcError::P2pDisabled => RPC_CLIENT_P2P_DISABLED,
            RpcError::Parse(_) => RPC_PARSE_ERROR,
            RpcError::InvalidRequest(_) => RPC_INVALID_REQUEST,
            RpcError::Internal(_) => RPC_INTERNAL_ERROR,
            RpcError::Command { source, .. } => source.code(),
        }
    }

    /// The error object placed in a reply's `error` field.
    pub fn to_json(&self) -> Value {
        json!({ "code": self.code(), "message": self.to_string() })
    }

    /// The error with any command tag removed.
    pub fn root(&self) -> &RpcError {
        match self {
            RpcError::Command { source, .. } => source.root(),
            other => other,
        }
    }

    /// Name of the command a handler failure came from, if tagged.
    pub fn method(&self) -> Option<&str> {
        match self {
            RpcError::Command { method, .. } => Some(method),
            _ => None,
        }
    }

    /// Caller mistakes, as opposed to failures inside the node.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self.root(), RpcError::Internal(_))
    }
}

impl From<NetworkError> for RpcError {
    fn from(e: NetworkError) -> Self {
        match e {
            NetworkError::InvalidSubnet(_) => RpcError::InvalidSubnet,
            NetworkError::AlreadyBanned(_) => RpcError::AlreadyBanned,
            NetworkError::NotBanned(_) => RpcError::NotFound,
            NetworkError::BanTimeInPast { .. } => {
                RpcError::InvalidParameter("Error: Absolute timestamp is in the past".into())
            }
            other => RpcError::Internal(other.to_string()),
        }
    }
}

impl From<AmountError> for RpcError {
    fn from(e: AmountError) -> Self {
        match e {
            AmountError::Invalid(_) => RpcError::InvalidAmount,
            AmountError::OutOfRange(_) => RpcError::AmountOutOfRange,
        }
    }
}
