//! Built-in commands.

pub mod blockchain;
pub mod control;
pub mod net;
pub mod rawtransaction;
pub mod wallet;

use crate::context::NodeContext;
use crate::error::RpcError;
use crate::table::{CommandDescriptor, CommandTable};

/// Every built-in command, in registration order.
pub fn all_commands() -> Vec<CommandDescriptor<NodeContext>> {
    let mut commands = Vec::new();
    commands.extend(control::commands());
    commands.extend(net::commands());
    commands.extend(blockchain::commands());
    commands.extend(rawtransaction::commands());
    commands.extend(wallet::commands());
    commands
}

/// Register the built-in commands, numbering them in registration order.
pub fn register_all(table: &mut CommandTable<NodeContext>) -> Result<(), RpcError> {
    let base = table.len() as u64;
    for (i, descriptor) in all_commands().into_iter().enumerate() {
        table.register(descriptor.with_unique_id(base + i as u64))?;
    }
    Ok(())
}
