//! Read-only view of the block index and chain-work helpers.
//!
//! The retarget and validation code only ever reads the chain through
//! [`ChainEntry`]. Nodes are owned by whoever built the index (the block
//! acceptance pipeline); entries are cheap `Copy` handles and predecessor
//! links never own their target.
//!
//! [`ChainIndex`] is an arena implementation of that view: nodes live in
//! one `Vec` and refer to their parent by [`BlockId`].

use crate::compact::{target_from_bits, U256};
use crate::params::ConsensusParams;

/// Number of blocks used for median-time-past.
pub const MEDIAN_TIME_SPAN: usize = 11;

/// A block in the chain index, as seen by consensus code.
pub trait ChainEntry: Copy {
    fn height(self) -> u32;

    /// Block timestamp (Unix seconds).
    fn time(self) -> i64;

    /// Compact difficulty bits.
    fn bits(self) -> u32;

    /// Cumulative work of the chain up to and including this block.
    fn chain_work(self) -> U256;

    /// The predecessor, `None` for genesis.
    fn prev(self) -> Option<Self>;

    /// The ancestor at `height`, `None` above this block's own height.
    fn ancestor(self, height: u32) -> Option<Self> {
        if height > self.height() {
            return None;
        }
        let mut entry = self;
        while entry.height() > height {
            entry = entry.prev()?;
        }
        Some(entry)
    }
}

/// Handle of a node inside a [`ChainIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(usize);

/// One block in the arena.
#[derive(Debug, Clone)]
pub struct BlockIndexNode {
    pub height: u32,
    pub time: i64,
    pub bits: u32,
    pub chain_work: U256,
    pub prev: Option<BlockId>,
}

/// Arena-backed block index.
#[derive(Debug, Clone, Default)]
pub struct ChainIndex {
    nodes: Vec<BlockIndexNode>,
}

impl ChainIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block with no parent at height 0.
    pub fn insert_genesis(&mut self, time: i64, bits: u32) -> BlockId {
        self.push(BlockIndexNode {
            height: 0,
            time,
            bits,
            chain_work: block_proof(bits),
            prev: None,
        })
    }

    /// Link a block on top of `prev`, accumulating chain work.
    ///
    /// Returns `None` if `prev` does not belong to this index.
    pub fn insert(&mut self, prev: BlockId, time: i64, bits: u32) -> Option<BlockId> {
        let parent = self.nodes.get(prev.0)?;
        let node = BlockIndexNode {
            height: parent.height + 1,
            time,
            bits,
            chain_work: parent.chain_work.saturating_add(block_proof(bits)),
            prev: Some(prev),
        };
        Some(self.push(node))
    }

    fn push(&mut self, node: BlockIndexNode) -> BlockId {
        self.nodes.push(node);
        BlockId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: BlockId) -> Option<BlockRef<'_>> {
        self.nodes.get(id.0).map(|_| BlockRef { index: self, id })
    }

    /// The most recently inserted block.
    pub fn tip(&self) -> Option<BlockRef<'_>> {
        self.nodes.len().checked_sub(1).and_then(|i| self.get(BlockId(i)))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Borrowed handle to a node in a [`ChainIndex`].
#[derive(Debug, Clone, Copy)]
pub struct BlockRef<'a> {
    index: &'a ChainIndex,
    id: BlockId,
}

impl<'a> BlockRef<'a> {
    pub fn id(&self) -> BlockId {
        self.id
    }

    fn node(&self) -> &'a BlockIndexNode {
        &self.index.nodes[self.id.0]
    }
}

impl PartialEq for BlockRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.index, other.index) && self.id == other.id
    }
}

impl<'a> ChainEntry for BlockRef<'a> {
    fn height(self) -> u32 {
        self.node().height
    }

    fn time(self) -> i64 {
        self.node().time
    }

    fn bits(self) -> u32 {
        self.node().bits
    }

    fn chain_work(self) -> U256 {
        self.node().chain_work
    }

    fn prev(self) -> Option<Self> {
        self.node().prev.map(|id| BlockRef {
            index: self.index,
            id,
        })
    }
}

/// Expected number of hashes to solve a block at `bits`.
///
/// Computed as `2^256 / (target + 1)` without leaving 256 bits:
/// `(2^256 - target - 1) / (target + 1) + 1`. Invalid bits give zero.
pub fn block_proof(bits: u32) -> U256 {
    match target_from_bits(bits) {
        Some(target) if target != U256::MAX => (!target / (target + 1)) + 1,
        Some(_) => U256::one(),
        None => U256::zero(),
    }
}

/// Seconds of work at the tip's rate separating `to` from `from`.
///
/// Negative when `from` carries more work. Saturates at `i64::MAX` in
/// magnitude.
pub fn block_proof_equivalent_time<E: ChainEntry>(
    to: E,
    from: E,
    tip: E,
    params: &ConsensusParams,
) -> i64 {
    let (diff, sign) = if to.chain_work() > from.chain_work() {
        (to.chain_work() - from.chain_work(), 1)
    } else {
        (from.chain_work() - to.chain_work(), -1)
    };

    let tip_proof = block_proof(tip.bits());
    if tip_proof.is_zero() {
        return sign * i64::MAX;
    }

    let spacing = U256::from(params.pow_target_spacing.max(0) as u64);
    let r = match diff.checked_mul(spacing) {
        Some(product) => product / tip_proof,
        None => return sign * i64::MAX,
    };
    if r.bits() > 63 {
        return sign * i64::MAX;
    }
    sign * r.low_u64() as i64
}

/// Median timestamp of the last [`MEDIAN_TIME_SPAN`] blocks ending at `entry`.
pub fn median_time_past<E: ChainEntry>(entry: E) -> i64 {
    let mut times = Vec::with_capacity(MEDIAN_TIME_SPAN);
    let mut cursor = Some(entry);
    while let Some(block) = cursor {
        if times.len() == MEDIAN_TIME_SPAN {
            break;
        }
        times.push(block.time());
        cursor = block.prev();
    }
    times.sort_unstable();
    times[times.len() / 2]
}
