//! Proof-of-work validation, with and without merge mining.

use log::trace;

use crate::block::BlockHeader;
use crate::compact::{self, U256};
use crate::error::{ConsensusError, ConsensusResult};
use crate::hash::Hash256;
use crate::params::ConsensusParams;

/// The chain's proof-of-work hash function.
///
/// Block identity is always double SHA256 ([`BlockHeader::hash`]); the
/// hash compared against the target may be a different function.
pub trait PowHasher {
    fn pow_hash(&self, header: &BlockHeader) -> Hash256;
}

/// Proof-of-work hash equal to the block identity hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256dHasher;

impl PowHasher for Sha256dHasher {
    fn pow_hash(&self, header: &BlockHeader) -> Hash256 {
        header.hash()
    }
}

/// Check that `hash` satisfies the compact target `bits`.
///
/// `bits` must decode to a positive, non-overflowed target no easier than
/// the pow limit.
pub fn check_proof_of_work(hash: &Hash256, bits: u32, params: &ConsensusParams) -> ConsensusResult<()> {
    let decoded = compact::decode(bits);
    if decoded.negative
        || decoded.value.is_zero()
        || decoded.overflow
        || decoded.value > params.pow_limit
    {
        return Err(ConsensusError::InvalidTarget { bits });
    }

    if U256::from_hash(hash) > decoded.value {
        return Err(ConsensusError::InsufficientWork);
    }
    Ok(())
}

/// Full proof-of-work check of a header, merge-mined or not.
pub fn check_auxpow_proof_of_work<H: PowHasher>(
    header: &BlockHeader,
    hasher: &H,
    params: &ConsensusParams,
) -> ConsensusResult<()> {
    let version = header.version;
    if !version.is_legacy() && params.strict_chain_id && version.chain_id() != params.auxpow_chain_id {
        return Err(ConsensusError::ChainIdMismatch {
            got: version.chain_id(),
            expected: params.auxpow_chain_id,
        });
    }

    let auxpow = match &header.auxpow {
        Some(auxpow) => auxpow,
        None => {
            if version.is_auxpow() {
                return Err(ConsensusError::AuxPowExpected);
            }
            return check_proof_of_work(&hasher.pow_hash(header), header.bits, params);
        }
    };

    if !version.is_auxpow() {
        return Err(ConsensusError::AuxPowUnexpected);
    }

    if !auxpow.check(&header.hash(), version.chain_id(), params) {
        return Err(ConsensusError::AuxPowInvalid);
    }

    trace!("auxpow accepted for chain id {}, checking parent work", version.chain_id());
    check_proof_of_work(&auxpow.parent_block_pow_hash(), header.bits, params)
}
