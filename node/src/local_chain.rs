//! In-memory block index serving `getblockstats`.

use std::sync::{RwLock, RwLockReadGuard};

use ember_rpc::{BlockRef, BlockSummary, ChainView};

/// Blocks in height order; the block at index `i` has height `i`.
#[derive(Debug, Default)]
pub struct MemoryChain {
    blocks: RwLock<Vec<BlockSummary>>,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<BlockSummary>> {
        self.blocks.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a block on top of the tip. Its height is overwritten with the
    /// next height and its hash is lowercased.
    pub fn push(&self, mut block: BlockSummary) -> u64 {
        let mut blocks = self.blocks.write().unwrap_or_else(|e| e.into_inner());
        let height = blocks.len() as u64;
        block.height = height;
        block.hash = block.hash.to_ascii_lowercase();
        tracing::trace!(height, hash = %block.hash, "block appended");
        blocks.push(block);
        height
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl ChainView for MemoryChain {
    fn tip_height(&self) -> Option<u64> {
        self.read().len().checked_sub(1).map(|h| h as u64)
    }

    fn block(&self, target: &BlockRef) -> Option<BlockSummary> {
        let blocks = self.read();
        match target {
            BlockRef::Height(h) => usize::try_from(*h).ok().and_then(|i| blocks.get(i)).cloned(),
            BlockRef::Hash(hash) => blocks
                .iter()
                .find(|b| b.hash.eq_ignore_ascii_case(hash))
                .cloned(),
        }
    }
}
