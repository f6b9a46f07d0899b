use ember_types::Amount;
use serde_json::Value;

use crate::args::{check_arity, get, optional_bool, required_str};
use crate::context::NodeContext;
use crate::error::RpcError;
use crate::table::{CommandDescriptor, Invocation};
use crate::value::amount_from_value;

/// Fee rate ceiling for `sendrawtransaction` when the caller gives none.
pub const DEFAULT_MAX_RAW_TX_FEE_RATE: Amount = Amount::from_units(100_000);

pub fn commands() -> Vec<CommandDescriptor<NodeContext>> {
    vec![
        CommandDescriptor::new(
            "rawtransactions",
            "decoderawtransaction",
            &["hexstring", "iswitness"],
            decoderawtransaction,
        ),
        CommandDescriptor::new(
            "rawtransactions",
            "sendrawtransaction",
            &["hexstring", "maxfeerate"],
            sendrawtransaction,
        ),
    ]
}

fn decode_failed() -> RpcError {
    RpcError::Deserialization("TX decode failed".into())
}

fn tx_bytes(args: &[Value]) -> Result<Vec<u8>, RpcError> {
    let text = required_str(args, 0, "hexstring")?;
    hex::decode(text).map_err(|_| decode_failed())
}

fn decode(ctx: &NodeContext, raw: &[u8], try_witness: bool) -> Result<Value, RpcError> {
    ctx.transactions.decode(raw, try_witness).map_err(|detail| {
        tracing::debug!(detail = %detail, "transaction decode failed");
        decode_failed()
    })
}

fn decoderawtransaction(call: &Invocation<'_, NodeContext>, args: &[Value]) -> Result<Value, RpcError> {
    check_arity(call, args, 1, 2)?;
    let raw = tx_bytes(args)?;
    let try_witness = optional_bool(args, 1)?.unwrap_or(true);
    decode(call.context, &raw, try_witness)
}

fn sendrawtransaction(call: &Invocation<'_, NodeContext>, args: &[Value]) -> Result<Value, RpcError> {
    check_arity(call, args, 1, 2)?;
    let raw = tx_bytes(args)?;
    let max_fee_rate = match get(args, 1) {
        Some(value) => amount_from_value(value)?,
        None => DEFAULT_MAX_RAW_TX_FEE_RATE,
    };
    decode(call.context, &raw, true)?;
    let txid = call.context.transactions.broadcast(&raw, max_fee_rate)?;
    tracing::info!(txid = %txid, "transaction submitted");
    Ok(Value::String(txid))
}
