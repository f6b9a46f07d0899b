//! Control interface of the Ember node.
//!
//! A request names a method and carries arguments by position or by name.
//! The [`Dispatcher`] looks the method up in its [`CommandTable`], refuses it
//! while the node is warming up, binds the arguments into one positional list
//! and runs the handler. Every failure is an [`RpcError`] with a stable code.
//!
//! Also here:
//! - the JSON-RPC envelope ([`RpcServer::handle_request_text`])
//! - conversion of command-line words into parameters ([`client`])
//! - help example formatting ([`help`])
//! - the built-in commands ([`commands`]) and the state they act on
//!   ([`NodeContext`])

pub mod args;
pub mod binding;
pub mod client;
pub mod commands;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod help;
pub mod request;
pub mod server;
pub mod table;
pub mod value;
pub mod warmup;

pub use binding::bind_arguments;
pub use client::{convert_named_values, convert_values};
pub use commands::register_all;
pub use context::{
    BlockRef, BlockSummary, ChainView, FeeSettings, NodeContext, PeerConnections,
    TransactionCodec, TxFeeSample,
};
pub use dispatcher::Dispatcher;
pub use error::RpcError;
pub use request::{JsonRpcReply, JsonRpcRequest, Params, Request};
pub use server::RpcServer;
pub use table::{CommandDescriptor, CommandTable, Handler, Invocation};
pub use value::{amount_from_value, parse_non_rfc_json_value, value_from_amount};
pub use warmup::WarmupState;
