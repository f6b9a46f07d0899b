//! Typed access to bound arguments for handlers.
//!
//! An absent slot and an explicit `null` are the same thing to a handler.

use serde_json::Value;

use crate::error::RpcError;
use crate::table::Invocation;
use crate::value::type_name;

/// Fail with the command's usage line unless `min <= args.len() <= max`.
///
/// Trailing nulls left by named binding do not count.
pub fn check_arity<C>(
    call: &Invocation<'_, C>,
    args: &[Value],
    min: usize,
    max: usize,
) -> Result<(), RpcError> {
    let supplied = args.iter().rposition(|v| !v.is_null()).map_or(0, |i| i + 1);
    if supplied < min || args.len() > max {
        return Err(RpcError::Usage(format!("Usage: {}", call.usage(min))));
    }
    Ok(())
}

/// The argument at `index`, or `None` when absent or null.
pub fn get(args: &[Value], index: usize) -> Option<&Value> {
    args.get(index).filter(|v| !v.is_null())
}

fn type_error(value: &Value, expected: &str) -> RpcError {
    RpcError::Type(format!(
        "JSON value of type {} is not of expected type {expected}",
        type_name(value)
    ))
}

pub fn required_str<'a>(args: &'a [Value], index: usize, name: &str) -> Result<&'a str, RpcError> {
    match get(args, index) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(type_error(other, "string")),
        None => Err(RpcError::InvalidParameter(format!("Missing required argument {name}"))),
    }
}

pub fn optional_bool(args: &[Value], index: usize) -> Result<Option<bool>, RpcError> {
    match get(args, index) {
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(type_error(other, "bool")),
        None => Ok(None),
    }
}

pub fn required_bool(args: &[Value], index: usize, name: &str) -> Result<bool, RpcError> {
    optional_bool(args, index)?
        .ok_or_else(|| RpcError::InvalidParameter(format!("Missing required argument {name}")))
}

/// An integer argument. Numbers with a fraction or exponent are rejected.
pub fn optional_i64(args: &[Value], index: usize) -> Result<Option<i64>, RpcError> {
    match get(args, index) {
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| RpcError::Type(format!("JSON integer out of range: {n}"))),
        Some(other) => Err(type_error(other, "number")),
        None => Ok(None),
    }
}
