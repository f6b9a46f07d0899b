use serde_json::Value;

use crate::args::{check_arity, get};
use crate::context::NodeContext;
use crate::error::RpcError;
use crate::table::{CommandDescriptor, Invocation};
use crate::value::{amount_from_value, value_from_amount};

pub fn commands() -> Vec<CommandDescriptor<NodeContext>> {
    vec![CommandDescriptor::new("wallet", "settxfee", &["amount"], settxfee)]
}

/// Set the fee per kilobyte used for new transactions. Zero restores
/// automatic fee selection.
fn settxfee(call: &Invocation<'_, NodeContext>, args: &[Value]) -> Result<Value, RpcError> {
    check_arity(call, args, 1, 1)?;
    let amount = amount_from_value(get(args, 0).unwrap_or(&Value::Null))?;

    let fees = &call.context.fees;
    let min_relay = fees.min_relay_fee();
    if !amount.is_zero() && amount < min_relay {
        return Err(RpcError::InvalidParameter(format!(
            "txfee cannot be less than min relay tx fee ({})",
            value_from_amount(min_relay)
        )));
    }
    fees.set_pay_tx_fee(amount);
    tracing::info!(fee = %amount, "transaction fee set");
    Ok(Value::Bool(true))
}
