//! Consensus arithmetic for NewYorkCoin.
//!
//! This crate provides pure Rust implementations of:
//! - Compact "nBits" target encoding, canonical and legacy signed
//! - Chain work and a read-only block index view
//! - Next required difficulty (Kimoto gravity well, Digishield, classic)
//! - Proof-of-work checks, including merge-mined (auxpow) headers
//! - The block subsidy schedule, with its Mersenne Twister legacy regime
//! - The dust fee
//!
//! Every entry point is a pure function of its inputs. Chain state is read
//! through [`ChainEntry`]; nothing is stored or fetched here.

pub mod amount;
pub mod bignum;
pub mod block;
pub mod chain;
pub mod compact;
pub mod difficulty;
pub mod error;
pub mod hash;
pub mod mt;
pub mod params;
pub mod pow;
pub mod seed;
pub mod subsidy;

pub use amount::{Amount, FeeRate, TxOut, CENT, COIN};
pub use block::{AuxPow, BlockHeader, BlockVersion};
pub use chain::{block_proof, BlockId, BlockRef, ChainEntry, ChainIndex};
pub use compact::U256;
pub use difficulty::{next_work_required, next_work_required_for};
pub use error::{ConfigError, ConsensusError, ConsensusResult};
pub use hash::{double_sha256, Hash256};
pub use params::{ChainParams, ConsensusParams, Network, RetargetAlgorithm};
pub use pow::{check_auxpow_proof_of_work, check_proof_of_work, PowHasher, Sha256dHasher};
pub use seed::parse_hex_seed;
pub use subsidy::{block_subsidy, dust_fee};
