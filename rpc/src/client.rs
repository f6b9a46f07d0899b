//! Conversion of command-line words into call parameters.
//!
//! Words are strings by default. Parameters listed in [`CONVERSION_TABLE`]
//! are parsed as JSON instead, so `setban 10.0.0.0/8 add 3600 true` sends a
//! number and a boolean.

use serde_json::Value;

use crate::binding::ARGS_KEY;
use crate::error::RpcError;
use crate::request::Params;
use crate::value::parse_non_rfc_json_value;

/// A parameter whose command-line text is JSON rather than a plain string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamConversion {
    pub method: &'static str,
    pub index: usize,
    pub name: &'static str,
    /// Keep the raw word as a string when it is not valid JSON.
    pub string_fallback: bool,
}

const fn entry(method: &'static str, index: usize, name: &'static str) -> ParamConversion {
    ParamConversion {
        method,
        index,
        name,
        string_fallback: false,
    }
}

pub const CONVERSION_TABLE: &[ParamConversion] = &[
    entry("setban", 2, "bantime"),
    entry("setban", 3, "absolute"),
    entry("setnetworkactive", 0, "state"),
    ParamConversion {
        method: "getblockstats",
        index: 0,
        name: "hash_or_height",
        string_fallback: true,
    },
    entry("getblockstats", 1, "stats"),
    entry("decoderawtransaction", 1, "iswitness"),
    entry("sendrawtransaction", 1, "maxfeerate"),
    entry("settxfee", 0, "amount"),
    entry("generatetoaddress", 0, "nblocks"),
    entry("generatetoaddress", 2, "maxtries"),
];

fn lookup(method: &str, matches: impl Fn(&ParamConversion) -> bool) -> Option<&'static ParamConversion> {
    CONVERSION_TABLE
        .iter()
        .find(|c| c.method == method && matches(*c))
}

fn convert_word(word: &str, conversion: Option<&ParamConversion>) -> Result<Value, RpcError> {
    match conversion {
        None => Ok(Value::String(word.to_string())),
        Some(c) => match parse_non_rfc_json_value(word) {
            Ok(value) => Ok(value),
            Err(_) if c.string_fallback => Ok(Value::String(word.to_string())),
            Err(e) => Err(e),
        },
    }
}

/// Positional words to parameters.
pub fn convert_values(method: &str, words: &[String]) -> Result<Params, RpcError> {
    let values = words
        .iter()
        .enumerate()
        .map(|(i, word)| convert_word(word, lookup(method, |c| c.index == i)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Params::Positional(values))
}

/// `name=value` words to named parameters.
///
/// Words without `=` become leading positional arguments under `args`.
/// Repeated names are kept so the node can reject them.
pub fn convert_named_values(method: &str, words: &[String]) -> Result<Params, RpcError> {
    let mut pairs = Vec::with_capacity(words.len());
    let mut positional = Vec::new();
    for word in words {
        match word.split_once('=') {
            Some((name, text)) => {
                let value = convert_word(text, lookup(method, |c| c.name == name))?;
                pairs.push((name.to_string(), value));
            }
            None => {
                let index = positional.len();
                positional.push(convert_word(word, lookup(method, |c| c.index == index))?);
            }
        }
    }
    if !positional.is_empty() {
        pairs.push((ARGS_KEY.to_string(), Value::Array(positional)));
    }
    Ok(Params::Named(pairs))
}
