//! Kimoto gravity well retarget.
//!
//! Walks back from the tip keeping a running average of past targets and
//! stops once the observed block rate leaves the "event horizon" band,
//! which narrows as more blocks are counted. The average is then scaled
//! by actual over expected seconds.
//!
//! This path runs on [`LegacyBigNum`] and evaluates the horizon band in
//! `f64` exactly as historic nodes did. Do not change operation order:
//! `1 + 0.7084 * (mass / 144)^-1.228`, then `1 / deviation` for the
//! lower bound.

use log::trace;

use crate::bignum::LegacyBigNum;
use crate::chain::ChainEntry;
use crate::compact;
use crate::error::{ConsensusError, ConsensusResult};
use crate::params::ConsensusParams;

/// Block spacing the gravity well was tuned for (seconds).
pub const BLOCKS_TARGET_SPACING: u64 = 30;

const TIME_DAY_SECONDS: u64 = 60 * 60 * 24;

/// 1% of a day.
pub const PAST_SECONDS_MIN: u64 = TIME_DAY_SECONDS / 100;

/// 14% of a day.
pub const PAST_SECONDS_MAX: u64 = TIME_DAY_SECONDS * 14 / 100;

/// Blocks counted before the horizon test may stop the walk (28).
pub const PAST_BLOCKS_MIN: u64 = PAST_SECONDS_MIN / BLOCKS_TARGET_SPACING;

/// Upper bound on blocks visited (403).
pub const PAST_BLOCKS_MAX: u64 = PAST_SECONDS_MAX / BLOCKS_TARGET_SPACING;

/// Gravity well with the historic window constants.
pub fn legacy_next_work_required<E: ChainEntry>(
    tip: E,
    params: &ConsensusParams,
) -> ConsensusResult<u32> {
    kimoto_gravity_well(
        tip,
        BLOCKS_TARGET_SPACING,
        PAST_BLOCKS_MIN,
        PAST_BLOCKS_MAX,
        params,
    )
}

/// State left behind by the backward walk.
#[derive(Debug, Clone)]
pub(crate) struct Walk {
    pub average: LegacyBigNum,
    pub actual_seconds: i64,
    pub target_seconds: i64,
    pub blocks: u64,
}

/// `1 + 0.7084 * (mass / 144)^-1.228`.
pub fn event_horizon_deviation(mass: u64) -> f64 {
    1.0 + (0.7084 * (mass as f64 / 144.0).powf(-1.228))
}

pub fn kimoto_gravity_well<E: ChainEntry>(
    tip: E,
    target_spacing: u64,
    past_blocks_min: u64,
    past_blocks_max: u64,
    params: &ConsensusParams,
) -> ConsensusResult<u32> {
    if tip.height() == 0 || (tip.height() as u64) < past_blocks_min {
        return Ok(params.pow_limit_bits());
    }

    let walk = walk(tip, target_spacing, past_blocks_min, past_blocks_max)?;

    let mut new = walk.average;
    if walk.actual_seconds != 0 && walk.target_seconds != 0 {
        new = (new * walk.actual_seconds)
            .checked_div(walk.target_seconds)
            .ok_or(ConsensusError::ArithmeticOverflow)?;
    }

    let pow_limit = LegacyBigNum::from_u256(&params.pow_limit);
    if new > pow_limit {
        new = pow_limit;
    }

    // Valid history only averages non-negative targets; a negative
    // average can only come from sign-bit bits and keeps its legacy form.
    let bits = match new.to_u256() {
        Some(target) => compact::encode(&target),
        None => new.to_legacy_compact(),
    };
    trace!(
        "gravity well: {} blocks, actual {}s, target {}s, after {:08x}",
        walk.blocks,
        walk.actual_seconds,
        walk.target_seconds,
        bits
    );
    Ok(bits)
}

pub(crate) fn walk<E: ChainEntry>(
    tip: E,
    target_spacing: u64,
    past_blocks_min: u64,
    past_blocks_max: u64,
) -> ConsensusResult<Walk> {
    let mut average = LegacyBigNum::zero();
    let mut mass: u64 = 0;
    let mut actual_seconds: i64 = 0;
    let mut target_seconds: i64 = 0;

    let mut reading = Some(tip);
    let mut i: u64 = 1;
    while let Some(block) = reading {
        if block.height() == 0 {
            break;
        }
        if past_blocks_max > 0 && i > past_blocks_max {
            break;
        }
        mass += 1;

        let difficulty = LegacyBigNum::from_legacy_compact(block.bits());
        average = if i == 1 {
            difficulty
        } else {
            let step = (difficulty - average.clone())
                .checked_div(i as i64)
                .ok_or(ConsensusError::ArithmeticOverflow)?;
            step + average
        };

        actual_seconds = tip.time() - block.time();
        target_seconds = (target_spacing * mass) as i64;

        let mut adjustment_ratio = 1.0f64;
        if actual_seconds < 0 {
            actual_seconds = 0;
        }
        if actual_seconds != 0 && target_seconds != 0 {
            adjustment_ratio = target_seconds as f64 / actual_seconds as f64;
        }

        let deviation_fast = event_horizon_deviation(mass);
        let deviation_slow = 1.0 / deviation_fast;

        if mass >= past_blocks_min
            && (adjustment_ratio <= deviation_slow || adjustment_ratio >= deviation_fast)
        {
            trace!(
                "gravity well: horizon reached at height {} (ratio {}, band {}..{})",
                block.height(),
                adjustment_ratio,
                deviation_slow,
                deviation_fast
            );
            break;
        }

        reading = block.prev();
        i += 1;
    }

    Ok(Walk {
        average,
        actual_seconds,
        target_seconds,
        blocks: mass,
    })
}
