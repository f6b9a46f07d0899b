use std::collections::HashSet;

use ember_utils::calculate_percentiles_by_weight;
use serde_json::{json, Map, Value};

use crate::args::{check_arity, get};
use crate::context::{BlockRef, BlockSummary, NodeContext};
use crate::error::RpcError;
use crate::table::{CommandDescriptor, Invocation};
use crate::value::type_name;

/// Weight units per virtual byte.
const WITNESS_SCALE_FACTOR: i64 = 4;

/// Statistic names accepted by `getblockstats`.
pub const BLOCK_STATS: &[&str] = &[
    "avgfee",
    "avgfeerate",
    "blockhash",
    "feerate_percentiles",
    "height",
    "maxfee",
    "maxfeerate",
    "medianfee",
    "minfee",
    "minfeerate",
    "time",
    "total_weight",
    "totalfee",
    "txs",
];

pub fn commands() -> Vec<CommandDescriptor<NodeContext>> {
    vec![CommandDescriptor::new(
        "blockchain",
        "getblockstats",
        &["hash_or_height", "stats"],
        getblockstats,
    )]
}

fn parse_hash(text: &str) -> Result<BlockRef, RpcError> {
    if text.len() != 64 {
        return Err(RpcError::InvalidParameter(format!(
            "blockhash must be of length 64 (not {}, for '{text}')",
            text.len()
        )));
    }
    if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RpcError::InvalidParameter(format!(
            "blockhash must be hexadecimal string (not '{text}')"
        )));
    }
    Ok(BlockRef::Hash(text.to_ascii_lowercase()))
}

fn parse_block_ref(value: &Value) -> Result<BlockRef, RpcError> {
    match value {
        Value::String(text) => parse_hash(text),
        Value::Number(n) => match n.as_i64() {
            Some(height) if height < 0 => Err(RpcError::InvalidParameter(format!(
                "Target block height {height} is negative"
            ))),
            Some(height) => Ok(BlockRef::Height(height as u64)),
            // An all-digit hash typed on the command line arrives as a number.
            None => parse_hash(&n.to_string()),
        },
        other => Err(RpcError::Type(format!(
            "JSON value of type {} is not of expected type number or string",
            type_name(other)
        ))),
    }
}

fn selected_stats(value: Option<&Value>) -> Result<Option<HashSet<String>>, RpcError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let Value::Array(items) = value else {
        return Err(RpcError::Type(format!(
            "JSON value of type {} is not of expected type array",
            type_name(value)
        )));
    };
    let mut selected = HashSet::with_capacity(items.len());
    for item in items {
        let name = item
            .as_str()
            .ok_or_else(|| RpcError::Type("stats must be strings".into()))?;
        if !BLOCK_STATS.contains(&name) {
            return Err(RpcError::InvalidParameter(format!(
                "Invalid selected statistic '{name}'"
            )));
        }
        selected.insert(name.to_string());
    }
    Ok(Some(selected))
}

/// Truncated median: the mean of the two middle values for even counts.
fn median(values: &mut [i64]) -> i64 {
    let len = values.len();
    if len == 0 {
        return 0;
    }
    values.sort_unstable();
    if len % 2 == 0 {
        let sum = i128::from(values[len / 2 - 1]) + i128::from(values[len / 2]);
        // The mean of two i64 values always fits back into i64.
        (sum / 2) as i64
    } else {
        values[len / 2]
    }
}

/// Fee statistics of one block.
///
/// Fees are in amount units, fee rates in units per virtual byte.
pub fn block_stats(block: &BlockSummary) -> Map<String, Value> {
    let txs = &block.transactions;
    let mut fees: Vec<i64> = txs.iter().map(|tx| tx.fee.units()).collect();
    let mut rates: Vec<(i64, i64)> = txs
        .iter()
        .map(|tx| {
            let rate = if tx.weight > 0 {
                tx.fee.units().saturating_mul(WITNESS_SCALE_FACTOR) / tx.weight
            } else {
                0
            };
            (rate, tx.weight)
        })
        .collect();

    let total_fee = fees.iter().fold(0i64, |acc, f| acc.saturating_add(*f));
    let total_weight = txs.iter().fold(0i64, |acc, tx| acc.saturating_add(tx.weight));
    let count = txs.len() as i64;

    rates.sort_unstable();
    let percentiles = calculate_percentiles_by_weight(&rates, total_weight);

    let mut stats = Map::new();
    stats.insert(
        "avgfee".into(),
        json!(if count > 0 { total_fee / count } else { 0 }),
    );
    stats.insert(
        "avgfeerate".into(),
        json!(if total_weight > 0 {
            total_fee.saturating_mul(WITNESS_SCALE_FACTOR) / total_weight
        } else {
            0
        }),
    );
    stats.insert("blockhash".into(), json!(block.hash));
    stats.insert("feerate_percentiles".into(), json!(percentiles));
    stats.insert("height".into(), json!(block.height));
    stats.insert("maxfee".into(), json!(fees.iter().copied().max().unwrap_or(0)));
    stats.insert(
        "maxfeerate".into(),
        json!(rates.iter().map(|(r, _)| *r).max().unwrap_or(0)),
    );
    stats.insert("medianfee".into(), json!(median(&mut fees)));
    stats.insert("minfee".into(), json!(fees.iter().copied().min().unwrap_or(0)));
    stats.insert(
        "minfeerate".into(),
        json!(rates.iter().map(|(r, _)| *r).min().unwrap_or(0)),
    );
    stats.insert("time".into(), json!(block.time));
    stats.insert("total_weight".into(), json!(total_weight));
    stats.insert("totalfee".into(), json!(total_fee));
    stats.insert("txs".into(), json!(count));
    stats
}

fn getblockstats(call: &Invocation<'_, NodeContext>, args: &[Value]) -> Result<Value, RpcError> {
    check_arity(call, args, 1, 2)?;
    let target = parse_block_ref(get(args, 0).unwrap_or(&Value::Null))?;
    let selected = selected_stats(get(args, 1))?;
    let chain = &call.context.chain;

    if let BlockRef::Height(height) = target {
        match chain.tip_height() {
            Some(tip) if height > tip => {
                return Err(RpcError::InvalidParameter(format!(
                    "Target block height {height} after current tip {tip}"
                )));
            }
            None => return Err(RpcError::InvalidAddressOrKey("Block not found".into())),
            Some(_) => {}
        }
    }
    let block = chain
        .block(&target)
        .ok_or_else(|| RpcError::InvalidAddressOrKey("Block not found".into()))?;
    tracing::trace!(block = %target, txs = block.transactions.len(), "computing block stats");

    let mut stats = block_stats(&block);
    if let Some(selected) = selected {
        stats.retain(|name, _| selected.contains(name));
    }
    Ok(Value::Object(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TxFeeSample;
    use ember_types::Amount;

    fn tx(fee: i64, weight: i64) -> TxFeeSample {
        TxFeeSample {
            fee: Amount::from_units(fee),
            weight,
        }
    }

    fn block(transactions: Vec<TxFeeSample>) -> BlockSummary {
        BlockSummary {
            hash: "ab".repeat(32),
            height: 7,
            time: 1_600_000_000,
            transactions,
        }
    }

    #[test]
    fn stats_over_transactions() {
        // fee rates: 40, 20, 10 per vbyte
        let stats = block_stats(&block(vec![tx(4000, 400), tx(1000, 200), tx(500, 200)]));
        assert_eq!(stats["txs"], json!(3));
        assert_eq!(stats["totalfee"], json!(5500));
        assert_eq!(stats["minfee"], json!(500));
        assert_eq!(stats["maxfee"], json!(4000));
        assert_eq!(stats["medianfee"], json!(1000));
        assert_eq!(stats["avgfee"], json!(1833));
        assert_eq!(stats["total_weight"], json!(800));
        assert_eq!(stats["minfeerate"], json!(10));
        assert_eq!(stats["maxfeerate"], json!(40));
        assert_eq!(stats["avgfeerate"], json!(27));
        // cumulative weight 200 (25%), 400 (50%), 800 (100%)
        assert_eq!(stats["feerate_percentiles"], json!([10, 10, 20, 40, 40]));
        assert_eq!(stats["height"], json!(7));
    }

    #[test]
    fn empty_block_is_all_zero() {
        let stats = block_stats(&block(vec![]));
        assert_eq!(stats["txs"], json!(0));
        assert_eq!(stats["minfee"], json!(0));
        assert_eq!(stats["avgfeerate"], json!(0));
        assert_eq!(stats["feerate_percentiles"], json!([0, 0, 0, 0, 0]));
    }

    #[test]
    fn even_count_median_is_truncated_mean() {
        assert_eq!(median(&mut [4, 1, 2, 8]), 3);
        assert_eq!(median(&mut [1, 2]), 1);
        assert_eq!(median(&mut []), 0);
    }

    #[test]
    fn median_of_extreme_fees_does_not_overflow() {
        assert_eq!(median(&mut [i64::MAX, i64::MAX]), i64::MAX);
        assert_eq!(median(&mut [i64::MAX, i64::MAX - 1]), i64::MAX - 1);
        assert_eq!(median(&mut [i64::MIN, i64::MIN]), i64::MIN);
    }

    #[test]
    fn block_refs() {
        assert_eq!(parse_block_ref(&json!(5)).unwrap(), BlockRef::Height(5));
        assert_eq!(parse_block_ref(&json!(-1)).unwrap_err().code(), -8);
        assert_eq!(
            parse_block_ref(&json!("AB".repeat(32))).unwrap(),
            BlockRef::Hash("ab".repeat(32))
        );
        assert!(parse_block_ref(&json!("abc")).is_err());
        assert!(parse_block_ref(&json!("zz".repeat(32))).is_err());
        assert_eq!(parse_block_ref(&json!(true)).unwrap_err().code(), -3);
    }

    #[test]
    fn stat_selection() {
        assert!(selected_stats(None).unwrap().is_none());
        let chosen = selected_stats(Some(&json!(["minfee", "txs"]))).unwrap().unwrap();
        assert_eq!(chosen.len(), 2);
        assert_eq!(
            selected_stats(Some(&json!(["nope"]))).unwrap_err().to_string(),
            "Invalid selected statistic 'nope'"
        );
    }
}
