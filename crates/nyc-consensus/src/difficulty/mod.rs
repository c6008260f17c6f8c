//! Next required difficulty.
//!
//! Three historical retarget algorithms coexist; which one runs at a
//! retarget boundary is chosen explicitly by
//! [`ConsensusParams::retarget_algorithm`]:
//! - [`gravity_well`]: Kimoto gravity well on a legacy signed bignum
//! - [`digishield`]: per-block damped retarget, or its pre-digishield
//!   height tiers
//! - [`classic`]: fixed-interval retarget clamped to 4x either way
//!
//! Each algorithm keeps its own arithmetic so old results replay
//! unchanged when new algorithms are added.

pub mod classic;
pub mod digishield;
pub mod gravity_well;

use log::debug;

use crate::chain::ChainEntry;
use crate::compact::{self, U256};
use crate::error::{ConsensusError, ConsensusResult};
use crate::params::{ChainParams, ConsensusParams, RetargetAlgorithm};

/// Compact bits required for the block following `tip`.
///
/// `tip` is `None` when the next block is genesis. `block_time` is the
/// candidate block's timestamp; it only matters on chains that allow
/// min-difficulty blocks. Params whose retarget interval is below one
/// block are rejected with [`ConsensusError::ArithmeticOverflow`].
pub fn next_work_required<E: ChainEntry>(
    tip: Option<E>,
    block_time: i64,
    params: &ConsensusParams,
) -> ConsensusResult<u32> {
    let pow_limit_bits = params.pow_limit_bits();

    let tip = match tip {
        Some(tip) => tip,
        None => return Ok(pow_limit_bits),
    };

    let interval = adjustment_interval(params)?;

    if allow_digishield_min_difficulty(tip, block_time, params) {
        return Ok(pow_limit_bits);
    }

    if (tip.height() as i64 + 1) % interval != 0 {
        if params.pow_allow_min_difficulty_blocks {
            let late = tip.time().saturating_add(params.pow_target_spacing.saturating_mul(20));
            if block_time > late {
                return Ok(pow_limit_bits);
            }
            return Ok(last_non_min_difficulty_bits(tip, interval, pow_limit_bits));
        }
        return Ok(tip.bits());
    }

    match params.retarget_algorithm {
        RetargetAlgorithm::GravityWell => gravity_well::legacy_next_work_required(tip, params),
        RetargetAlgorithm::Digishield => {
            let first = retarget_window_start(tip, params)?;
            digishield::calculate(tip, first.time(), params)
        }
        RetargetAlgorithm::Classic => {
            let first = retarget_window_start(tip, params)?;
            classic::calculate(tip, first.time(), params)
        }
    }
}

/// [`next_work_required`] with the era in force at the new block's height.
pub fn next_work_required_for<E: ChainEntry>(
    chain_params: &ChainParams,
    tip: Option<E>,
    block_time: i64,
) -> ConsensusResult<u32> {
    let height = tip.map_or(0, |tip| tip.height().saturating_add(1));
    next_work_required(tip, block_time, chain_params.consensus_at(height))
}

/// Min-difficulty blocks on retarget blocks once every block retargets.
///
/// Only on chains that allow min-difficulty blocks, only from the gate
/// height on, and only when the candidate is more than two spacings late.
pub fn allow_digishield_min_difficulty<E: ChainEntry>(
    tip: E,
    block_time: i64,
    params: &ConsensusParams,
) -> bool {
    if !params.pow_allow_min_difficulty_blocks {
        return false;
    }
    if tip.height() < params.min_difficulty_gate_height {
        return false;
    }
    block_time > tip.time().saturating_add(params.pow_target_spacing.saturating_mul(2))
}

/// Retarget interval, refusing params that would divide by zero.
fn adjustment_interval(params: &ConsensusParams) -> ConsensusResult<i64> {
    match params.difficulty_adjustment_interval() {
        interval if interval >= 1 => Ok(interval),
        _ => Err(ConsensusError::ArithmeticOverflow),
    }
}

/// Bits of the last block that was not mined under the min-difficulty rule.
fn last_non_min_difficulty_bits<E: ChainEntry>(tip: E, interval: i64, pow_limit_bits: u32) -> u32 {
    let mut entry = tip;
    while entry.height() as i64 % interval != 0 && entry.bits() == pow_limit_bits {
        match entry.prev() {
            Some(prev) => entry = prev,
            None => break,
        }
    }
    entry.bits()
}

/// First block of the window a fixed-interval retarget measures.
///
/// Goes back a full interval, except for the very first retarget after
/// genesis which only has `interval - 1` blocks behind it.
pub fn retarget_window_start<E: ChainEntry>(tip: E, params: &ConsensusParams) -> ConsensusResult<E> {
    let interval = adjustment_interval(params)?;
    let blocks_to_go_back = if tip.height() as i64 + 1 == interval {
        interval - 1
    } else {
        interval
    };

    let first_height = tip.height() as i64 - blocks_to_go_back;
    u32::try_from(first_height)
        .ok()
        .and_then(|height| tip.ancestor(height))
        .ok_or(ConsensusError::MissingAncestor {
            height: first_height,
        })
}

/// `target(bits) * timespan / target_timespan`, capped at the pow limit.
///
/// Shared tail of the digishield and classic algorithms; `timespan` has
/// already been clamped by the caller.
fn retarget(bits: u32, timespan: i64, params: &ConsensusParams) -> ConsensusResult<u32> {
    let multiplier = u64::try_from(timespan).map_err(|_| ConsensusError::ArithmeticOverflow)?;
    let divisor = u64::try_from(params.pow_target_timespan)
        .map_err(|_| ConsensusError::ArithmeticOverflow)?;

    let old = compact::decode(bits).value;
    let mut new: U256 = old.checked_mul_u64(multiplier)?.checked_div_u64(divisor)?;
    if new > params.pow_limit {
        new = params.pow_limit;
    }

    let new_bits = compact::encode(&new);
    debug!(
        "retarget: target timespan {}s, adjusted timespan {}s, before {:08x}, after {:08x}",
        params.pow_target_timespan, timespan, bits, new_bits
    );
    Ok(new_bits)
}
