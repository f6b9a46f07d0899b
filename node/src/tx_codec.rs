//! Raw transaction codec for `decoderawtransaction` / `sendrawtransaction`.
//!
//! Wire layout (all integers little-endian):
//!
//! ```text
//! version u32 | time u32 | [0x00 flags] | vin | vout | [witness] | locktime u32
//! ```
//!
//! `vin` and `vout` are CompactSize-prefixed lists. The marker/flags pair
//! and the per-input witness stacks are only recognised when witness
//! decoding is requested. Transaction ids are double SHA-256 of the
//! serialization without witness data, displayed byte-reversed.

use std::sync::{Arc, Mutex};

use ember_rpc::{value_from_amount, PeerConnections, RpcError, TransactionCodec};
use ember_types::{Amount, Clock};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::local_broadcaster::LocalBroadcaster;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TxDecodeError {
    #[error("unexpected end of data at offset {0}")]
    UnexpectedEnd(usize),

    #[error("non-canonical CompactSize at offset {0}")]
    NonCanonicalSize(usize),

    #[error("length {len} at offset {offset} exceeds remaining data")]
    Oversized { offset: usize, len: u64 },

    #[error("superfluous witness record")]
    SuperfluousWitness,

    #[error("unknown transaction optional data (flags {0:#04x})")]
    UnknownFlags(u8),

    #[error("{0} trailing bytes")]
    TrailingData(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    pub prev_hash: [u8; 32],
    pub prev_index: u32,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
    pub witness: Vec<Vec<u8>>,
}

impl TxIn {
    fn is_coinbase(&self) -> bool {
        self.prev_index == u32::MAX && self.prev_hash == [0u8; 32]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    pub value: i64,
    pub script_pubkey: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub time: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
}

// ── Decoding ───────────────────────────────────────────────────────────

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], TxDecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or(TxDecodeError::UnexpectedEnd(self.pos))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], TxDecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, TxDecodeError> {
        Ok(self.array::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32, TxDecodeError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn i64(&mut self) -> Result<i64, TxDecodeError> {
        Ok(i64::from_le_bytes(self.array()?))
    }

    fn compact_size(&mut self) -> Result<u64, TxDecodeError> {
        let offset = self.pos;
        let (value, min) = match self.u8()? {
            0xfd => (u64::from(u16::from_le_bytes(self.array()?)), 0xfd),
            0xfe => (u64::from(u32::from_le_bytes(self.array()?)), 0x1_0000),
            0xff => (u64::from_le_bytes(self.array()?), 0x1_0000_0000),
            small => return Ok(u64::from(small)),
        };
        if value < min {
            return Err(TxDecodeError::NonCanonicalSize(offset));
        }
        Ok(value)
    }

    /// A count of items that each take at least one byte, so it can never
    /// exceed what is left.
    fn count(&mut self) -> Result<usize, TxDecodeError> {
        let offset = self.pos;
        let len = self.compact_size()?;
        let remaining = self.data.len() - self.pos;
        usize::try_from(len)
            .ok()
            .filter(|n| *n <= remaining)
            .ok_or(TxDecodeError::Oversized { offset, len })
    }

    fn var_bytes(&mut self) -> Result<Vec<u8>, TxDecodeError> {
        let n = self.count()?;
        Ok(self.take(n)?.to_vec())
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

fn read_inputs(r: &mut Reader<'_>) -> Result<Vec<TxIn>, TxDecodeError> {
    let n = r.count()?;
    let mut inputs = Vec::with_capacity(n);
    for _ in 0..n {
        inputs.push(TxIn {
            prev_hash: r.array()?,
            prev_index: r.u32()?,
            script_sig: r.var_bytes()?,
            sequence: r.u32()?,
            witness: Vec::new(),
        });
    }
    Ok(inputs)
}

fn read_outputs(r: &mut Reader<'_>) -> Result<Vec<TxOut>, TxDecodeError> {
    let n = r.count()?;
    let mut outputs = Vec::with_capacity(n);
    for _ in 0..n {
        outputs.push(TxOut {
            value: r.i64()?,
            script_pubkey: r.var_bytes()?,
        });
    }
    Ok(outputs)
}

impl Transaction {
    pub fn decode(raw: &[u8], try_witness: bool) -> Result<Self, TxDecodeError> {
        let mut r = Reader::new(raw);
        let version = r.u32()?;
        let time = r.u32()?;

        let mut flags = 0u8;
        let mut inputs = read_inputs(&mut r)?;
        let outputs = if inputs.is_empty() && try_witness {
            flags = r.u8()?;
            if flags != 0 {
                inputs = read_inputs(&mut r)?;
                read_outputs(&mut r)?
            } else {
                Vec::new()
            }
        } else {
            read_outputs(&mut r)?
        };

        if flags & 1 != 0 {
            flags ^= 1;
            for input in &mut inputs {
                let items = r.count()?;
                input.witness = (0..items).map(|_| r.var_bytes()).collect::<Result<_, _>>()?;
            }
            if inputs.iter().all(|i| i.witness.is_empty()) {
                return Err(TxDecodeError::SuperfluousWitness);
            }
        }
        if flags != 0 {
            return Err(TxDecodeError::UnknownFlags(flags));
        }

        let lock_time = r.u32()?;
        if r.remaining() > 0 {
            return Err(TxDecodeError::TrailingData(r.remaining()));
        }
        Ok(Self {
            version,
            time,
            inputs,
            outputs,
            lock_time,
        })
    }

    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|i| !i.witness.is_empty())
    }

    pub fn serialize(&self, with_witness: bool) -> Vec<u8> {
        let with_witness = with_witness && self.has_witness();
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.time.to_le_bytes());
        if with_witness {
            out.extend_from_slice(&[0x00, 0x01]);
        }
        write_compact_size(&mut out, self.inputs.len() as u64);
        for input in &self.inputs {
            out.extend_from_slice(&input.prev_hash);
            out.extend_from_slice(&input.prev_index.to_le_bytes());
            write_var_bytes(&mut out, &input.script_sig);
            out.extend_from_slice(&input.sequence.to_le_bytes());
        }
        write_compact_size(&mut out, self.outputs.len() as u64);
        for output in &self.outputs {
            out.extend_from_slice(&output.value.to_le_bytes());
            write_var_bytes(&mut out, &output.script_pubkey);
        }
        if with_witness {
            for input in &self.inputs {
                write_compact_size(&mut out, input.witness.len() as u64);
                for item in &input.witness {
                    write_var_bytes(&mut out, item);
                }
            }
        }
        out.extend_from_slice(&self.lock_time.to_le_bytes());
        out
    }

    /// Id over the serialization without witness data.
    pub fn txid(&self) -> String {
        display_hash(&self.serialize(false))
    }

    /// Id over the full serialization.
    pub fn wtxid(&self) -> String {
        display_hash(&self.serialize(true))
    }

    pub fn weight(&self) -> usize {
        let stripped = self.serialize(false).len();
        let total = self.serialize(true).len();
        stripped * 3 + total
    }

    pub fn to_json(&self) -> Value {
        let vin: Vec<Value> = self
            .inputs
            .iter()
            .map(|input| {
                let mut obj = Map::new();
                if input.is_coinbase() {
                    obj.insert("coinbase".into(), json!(hex::encode(&input.script_sig)));
                } else {
                    let mut prev = input.prev_hash;
                    prev.reverse();
                    obj.insert("txid".into(), json!(hex::encode(prev)));
                    obj.insert("vout".into(), json!(input.prev_index));
                    obj.insert(
                        "scriptSig".into(),
                        json!({ "hex": hex::encode(&input.script_sig) }),
                    );
                }
                if !input.witness.is_empty() {
                    let items: Vec<String> = input.witness.iter().map(hex::encode).collect();
                    obj.insert("txinwitness".into(), json!(items));
                }
                obj.insert("sequence".into(), json!(input.sequence));
                Value::Object(obj)
            })
            .collect();

        let vout: Vec<Value> = self
            .outputs
            .iter()
            .enumerate()
            .map(|(n, output)| {
                json!({
                    "value": value_from_amount(Amount::from_units(output.value)),
                    "n": n,
                    "scriptPubKey": { "hex": hex::encode(&output.script_pubkey) },
                })
            })
            .collect();

        let size = self.serialize(true).len();
        let weight = self.weight();
        json!({
            "txid": self.txid(),
            "hash": self.wtxid(),
            "version": self.version,
            "time": self.time,
            "size": size,
            "vsize": weight.div_ceil(4),
            "weight": weight,
            "locktime": self.lock_time,
            "vin": vin,
            "vout": vout,
        })
    }

    /// Context-free validity rules applied before relay.
    fn check(&self) -> Result<(), RpcError> {
        if self.inputs.is_empty() {
            return Err(RpcError::VerifyRejected("bad-txns-vin-empty".into()));
        }
        if self.outputs.is_empty() {
            return Err(RpcError::VerifyRejected("bad-txns-vout-empty".into()));
        }
        let mut total = Amount::ZERO;
        for output in &self.outputs {
            let value = Amount::from_units(output.value);
            if value.units() < 0 {
                return Err(RpcError::VerifyRejected("bad-txns-vout-negative".into()));
            }
            if !value.is_money_range() {
                return Err(RpcError::VerifyRejected("bad-txns-vout-toolarge".into()));
            }
            total = total
                .checked_add(value)
                .filter(Amount::is_money_range)
                .ok_or_else(|| RpcError::VerifyRejected("bad-txns-txouttotal-toolarge".into()))?;
        }
        Ok(())
    }
}

fn write_compact_size(out: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

fn write_var_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_compact_size(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

fn display_hash(bytes: &[u8]) -> String {
    let mut digest: [u8; 32] = Sha256::digest(Sha256::digest(bytes)).into();
    digest.reverse();
    hex::encode(digest)
}

// ── Codec ──────────────────────────────────────────────────────────────

/// [`TransactionCodec`] that decodes locally and queues accepted
/// transactions for relay.
pub struct LegacyTxCodec {
    connections: Arc<dyn PeerConnections>,
    clock: Arc<dyn Clock>,
    relay: Mutex<LocalBroadcaster>,
}

impl LegacyTxCodec {
    pub fn new(connections: Arc<dyn PeerConnections>, clock: Arc<dyn Clock>) -> Self {
        Self {
            connections,
            clock,
            relay: Mutex::new(LocalBroadcaster::with_default()),
        }
    }

    /// Transactions accepted for relay and not yet handed to peers.
    pub fn pending_relay(&self) -> usize {
        self.relay.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Hand every queued transaction to the caller, oldest first.
    pub fn take_relay_queue(&self) -> Vec<(String, Vec<u8>)> {
        self.relay.lock().unwrap_or_else(|e| e.into_inner()).take_all()
    }
}

impl TransactionCodec for LegacyTxCodec {
    fn decode(&self, raw: &[u8], try_witness: bool) -> Result<Value, String> {
        Transaction::decode(raw, try_witness)
            .map(|tx| tx.to_json())
            .map_err(|e| e.to_string())
    }

    fn broadcast(&self, raw: &[u8], max_fee_rate: Amount) -> Result<String, RpcError> {
        if !self.connections.is_network_active() {
            return Err(RpcError::P2pDisabled);
        }
        let tx = Transaction::decode(raw, true)
            .map_err(|_| RpcError::Deserialization("TX decode failed".into()))?;
        tx.check()?;

        let txid = tx.txid();
        let fresh = self
            .relay
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .track(txid.clone(), raw.to_vec(), self.clock.now().as_secs());
        tracing::debug!(txid = %txid, fresh, max_fee_rate = %max_fee_rate, "queued for relay");
        Ok(txid)
    }
}
