//! Argument binding: turning named arguments into a positional list.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::RpcError;
use crate::request::Params;

/// Key under which named calls pass leading positional arguments.
pub const ARGS_KEY: &str = "args";

/// Produce the canonical positional argument list for a call.
///
/// Positional params pass through untouched. Named params are placed at the
/// index of their declared name; an `args` array (when `args` is not itself a
/// declared name) fills the leading positions. Slots set by neither stay
/// `null`, and the list ends at the last slot that was set.
pub fn bind_arguments(params: &Params, arg_names: &[String]) -> Result<Vec<Value>, RpcError> {
    let pairs = match params {
        Params::Positional(values) => return Ok(values.clone()),
        Params::Named(pairs) => pairs,
    };

    let mut seen = HashSet::with_capacity(pairs.len());
    for (key, _) in pairs {
        if !seen.insert(key.as_str()) {
            return Err(RpcError::DuplicateNamedParameter(key.clone()));
        }
    }

    let args_declared = arg_names.iter().any(|name| name == ARGS_KEY);
    let mut positional: &[Value] = &[];
    let mut named: Vec<(usize, &String, &Value)> = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        match arg_names.iter().position(|name| name == key) {
            Some(index) => named.push((index, key, value)),
            None => match value {
                Value::Array(values) if key == ARGS_KEY && !args_declared => {
                    positional = values;
                }
                _ => return Err(RpcError::UnknownNamedParameter(key.clone())),
            },
        }
    }

    named.sort_by_key(|(index, _, _)| *index);
    if let Some((_, key, _)) = named.iter().find(|(index, _, _)| *index < positional.len()) {
        return Err(RpcError::PositionalNamedOverlap((*key).clone()));
    }

    let len = named
        .last()
        .map_or(0, |(index, _, _)| index + 1)
        .max(positional.len());
    let mut bound = Vec::with_capacity(len);
    bound.extend_from_slice(positional);
    bound.resize(len, Value::Null);
    for (index, _, value) in named {
        bound[index] = value.clone();
    }
    Ok(bound)
}
