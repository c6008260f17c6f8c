//! Block header, merge-mining version bits and the auxpow seam.

use std::fmt;
use std::sync::Arc;

use crate::hash::{double_sha256, Hash256};
use crate::params::ConsensusParams;

/// Block version with the merge-mining bit field.
///
/// Bits 0..8 hold the base version, bit 8 flags an attached auxpow and
/// bits 16.. carry the merge-mining chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockVersion(pub i32);

impl BlockVersion {
    /// Bit set when the block carries an auxpow.
    pub const VERSION_AUXPOW: i32 = 1 << 8;

    /// Multiplier of the chain id.
    pub const VERSION_CHAIN_START: i32 = 1 << 16;

    /// Version built from a base version and chain id, without auxpow.
    pub fn new(base_version: i32, chain_id: i32) -> Self {
        let mut version = BlockVersion(0);
        version.set_base_version(base_version, chain_id);
        version
    }

    pub fn base_version(self) -> i32 {
        self.0 % Self::VERSION_AUXPOW
    }

    pub fn chain_id(self) -> i32 {
        self.0 >> 16
    }

    pub fn is_auxpow(self) -> bool {
        self.0 & Self::VERSION_AUXPOW != 0
    }

    /// Pre-merge-mining versions, exempt from chain id checks.
    pub fn is_legacy(self) -> bool {
        self.0 == 1 || (self.0 == 2 && self.chain_id() == 0)
    }

    /// Replace the whole version, clearing the auxpow flag.
    pub fn set_base_version(&mut self, base_version: i32, chain_id: i32) {
        self.0 = (base_version % Self::VERSION_AUXPOW) | chain_id.wrapping_mul(Self::VERSION_CHAIN_START);
    }

    pub fn set_chain_id(&mut self, chain_id: i32) {
        self.0 %= Self::VERSION_CHAIN_START;
        self.0 |= chain_id.wrapping_mul(Self::VERSION_CHAIN_START);
    }

    pub fn set_auxpow(&mut self, auxpow: bool) {
        if auxpow {
            self.0 |= Self::VERSION_AUXPOW;
        } else {
            self.0 &= !Self::VERSION_AUXPOW;
        }
    }
}

impl From<i32> for BlockVersion {
    fn from(version: i32) -> Self {
        BlockVersion(version)
    }
}

impl fmt::Display for BlockVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// A merge-mining proof tying this block to a parent chain's work.
///
/// The merkle branches inside the proof are opaque here; implementors
/// decide structural validity.
pub trait AuxPow: fmt::Debug + Send + Sync {
    /// Whether the proof commits to `block_hash` for `chain_id`.
    fn check(&self, block_hash: &Hash256, chain_id: i32, params: &ConsensusParams) -> bool;

    /// Proof-of-work hash of the parent block that did the work.
    fn parent_block_pow_hash(&self) -> Hash256;
}

/// A block header (80 serialized bytes) with an optional auxpow.
#[derive(Debug, Clone, Default)]
pub struct BlockHeader {
    pub version: BlockVersion,
    /// Previous block hash (internal byte order).
    pub prev_block_hash: Hash256,
    pub merkle_root: Hash256,
    /// Unix time.
    pub time: u32,
    /// Compact difficulty target.
    pub bits: u32,
    pub nonce: u32,
    pub auxpow: Option<Arc<dyn AuxPow>>,
}

impl BlockHeader {
    pub fn new(version: BlockVersion, prev_block_hash: Hash256, merkle_root: Hash256, time: u32, bits: u32) -> Self {
        BlockHeader {
            version,
            prev_block_hash,
            merkle_root,
            time,
            bits,
            nonce: 0,
            auxpow: None,
        }
    }

    /// Attach (or drop) a merge-mining proof, keeping the version flag in step.
    pub fn set_auxpow(&mut self, auxpow: Option<Arc<dyn AuxPow>>) {
        self.version.set_auxpow(auxpow.is_some());
        self.auxpow = auxpow;
    }

    /// Serialize the header to 80 bytes. The auxpow is not part of it.
    pub fn serialize(&self) -> [u8; 80] {
        let mut header = [0u8; 80];
        header[0..4].copy_from_slice(&self.version.0.to_le_bytes());
        header[4..36].copy_from_slice(&self.prev_block_hash);
        header[36..68].copy_from_slice(&self.merkle_root);
        header[68..72].copy_from_slice(&self.time.to_le_bytes());
        header[72..76].copy_from_slice(&self.bits.to_le_bytes());
        header[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        header
    }

    /// Block identity hash (double SHA256 of the 80 header bytes).
    pub fn hash(&self) -> Hash256 {
        double_sha256(&self.serialize())
    }
}
