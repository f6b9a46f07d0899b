use ember_network::parse_subnet;
use serde_json::{json, Value};

use crate::args::{check_arity, optional_bool, optional_i64, required_bool, required_str};
use crate::context::NodeContext;
use crate::error::RpcError;
use crate::table::{CommandDescriptor, Invocation};
use crate::value::value_from_amount;

pub fn commands() -> Vec<CommandDescriptor<NodeContext>> {
    vec![
        CommandDescriptor::new(
            "network",
            "setban",
            &["subnet", "command", "bantime", "absolute"],
            setban,
        ),
        CommandDescriptor::new("network", "listbanned", &[], listbanned),
        CommandDescriptor::new("network", "clearbanned", &[], clearbanned),
        CommandDescriptor::new("network", "setnetworkactive", &["state"], setnetworkactive),
        CommandDescriptor::new("network", "getnetworkinfo", &[], getnetworkinfo),
    ]
}

/// `setban subnet add|remove ( bantime absolute )`
///
/// A missing, zero or negative bantime applies the default ban length.
fn setban(call: &Invocation<'_, NodeContext>, args: &[Value]) -> Result<Value, RpcError> {
    check_arity(call, args, 2, 4)?;
    let command = required_str(args, 1, "command")?;
    if command != "add" && command != "remove" {
        return Err(RpcError::Usage(format!("Usage: {}", call.usage(2))));
    }

    let ctx = call.context;
    let subnet = parse_subnet(required_str(args, 0, "subnet")?)?;

    if command == "add" {
        let bantime = optional_i64(args, 2)?.unwrap_or(0).max(0) as u64;
        let absolute = optional_bool(args, 3)?.unwrap_or(false);
        ctx.banlist.add(subnet, bantime, absolute)?;
        if let Some(connections) = &ctx.connections {
            let dropped = connections.disconnect(&subnet);
            if dropped > 0 {
                tracing::info!(subnet = %subnet, dropped, "disconnected banned peers");
            }
        }
    } else {
        ctx.banlist.remove(&subnet)?;
    }
    Ok(Value::Null)
}

fn listbanned(call: &Invocation<'_, NodeContext>, args: &[Value]) -> Result<Value, RpcError> {
    check_arity(call, args, 0, 0)?;
    serde_json::to_value(call.context.banlist.list()).map_err(|e| RpcError::Internal(e.to_string()))
}

fn clearbanned(call: &Invocation<'_, NodeContext>, args: &[Value]) -> Result<Value, RpcError> {
    check_arity(call, args, 0, 0)?;
    call.context.banlist.clear();
    Ok(Value::Null)
}

fn setnetworkactive(call: &Invocation<'_, NodeContext>, args: &[Value]) -> Result<Value, RpcError> {
    check_arity(call, args, 1, 1)?;
    let state = required_bool(args, 0, "state")?;
    let connections = call.context.connections()?;
    connections.set_network_active(state);
    Ok(Value::Bool(connections.is_network_active()))
}

/// Client version as `major * 10000 + minor * 100 + patch`.
fn client_version() -> u64 {
    let part = |text: &str| text.parse::<u64>().unwrap_or(0);
    part(env!("CARGO_PKG_VERSION_MAJOR")) * 10_000
        + part(env!("CARGO_PKG_VERSION_MINOR")) * 100
        + part(env!("CARGO_PKG_VERSION_PATCH"))
}

fn getnetworkinfo(call: &Invocation<'_, NodeContext>, args: &[Value]) -> Result<Value, RpcError> {
    check_arity(call, args, 0, 0)?;
    let ctx = call.context;
    let connections = ctx.connections.as_deref();
    Ok(json!({
        "version": client_version(),
        "subversion": format!("/Ember:{}/", env!("CARGO_PKG_VERSION")),
        "network": ctx.network.as_str(),
        "networkactive": connections.is_some_and(|c| c.is_network_active()),
        "connections": connections.map_or(0, |c| c.connection_count()),
        "relayfee": value_from_amount(ctx.fees.min_relay_fee()),
        "paytxfee": value_from_amount(ctx.fees.pay_tx_fee()),
    }))
}
