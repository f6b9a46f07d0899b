//! Local transaction relay queue.
//!
//! Transactions submitted through `sendrawtransaction` are held here until
//! peers pick them up. When full, the oldest submission is evicted.

use std::collections::HashMap;

/// Maximum locally tracked transactions.
const MAX_LOCAL_TXS: usize = 1024;

pub struct LocalBroadcaster {
    txs: HashMap<String, LocalTxEntry>,
    max_entries: usize,
    /// Monotonic submission counter used for eviction order.
    sequence: u64,
}

struct LocalTxEntry {
    raw: Vec<u8>,
    sequence: u64,
    submitted_at: u64,
}

impl LocalBroadcaster {
    pub fn new(max_entries: usize) -> Self {
        Self {
            txs: HashMap::new(),
            max_entries: max_entries.max(1),
            sequence: 0,
        }
    }

    pub fn with_default() -> Self {
        Self::new(MAX_LOCAL_TXS)
    }

    /// Track a transaction for relay. Returns `false` when it was already
    /// tracked (the earlier submission is kept).
    pub fn track(&mut self, txid: String, raw: Vec<u8>, now_secs: u64) -> bool {
        if self.txs.contains_key(&txid) {
            return false;
        }
        if self.txs.len() >= self.max_entries {
            // Evict oldest
            if let Some(oldest) = self
                .txs
                .iter()
                .min_by_key(|(_, e)| e.sequence)
                .map(|(id, _)| id.clone())
            {
                tracing::debug!(txid = %oldest, "relay queue full, evicting");
                self.txs.remove(&oldest);
            }
        }
        self.sequence += 1;
        self.txs.insert(
            txid,
            LocalTxEntry {
                raw,
                sequence: self.sequence,
                submitted_at: now_secs,
            },
        );
        true
    }

    pub fn get(&self, txid: &str) -> Option<&[u8]> {
        self.txs.get(txid).map(|e| e.raw.as_slice())
    }

    pub fn submitted_at(&self, txid: &str) -> Option<u64> {
        self.txs.get(txid).map(|e| e.submitted_at)
    }

    /// Drain every tracked transaction, oldest first.
    pub fn take_all(&mut self) -> Vec<(String, Vec<u8>)> {
        let mut drained: Vec<(String, LocalTxEntry)> = self.txs.drain().collect();
        drained.sort_by_key(|(_, e)| e.sequence);
        drained.into_iter().map(|(id, e)| (id, e.raw)).collect()
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }
}
