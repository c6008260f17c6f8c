//! Digishield retarget and its pre-digishield height tiers.
//!
//! With digishield active every block is a retarget point: the measured
//! timespan is damped to an eighth of its deviation and clamped to
//! `[-25%, +50%]` of the target timespan. Before digishield the raw
//! timespan is clamped to height-dependent bounds:
//!
//! | next height | min      | max  |
//! |-------------|----------|------|
//! | <= 5,000    | T / 16   | T*4  |
//! | <= 10,000   | T / 8    | T*4  |
//! | > 10,000    | T / 4    | T*4  |

use crate::chain::ChainEntry;
use crate::error::ConsensusResult;
use crate::params::ConsensusParams;

/// New bits for the block after `tip`, given the window's first block time.
pub fn calculate<E: ChainEntry>(
    tip: E,
    first_block_time: i64,
    params: &ConsensusParams,
) -> ConsensusResult<u32> {
    let height = tip.height() as i64 + 1;
    let actual_timespan = tip.time() - first_block_time;
    let modulated = modulated_timespan(height, actual_timespan, params);
    super::retarget(tip.bits(), modulated, params)
}

/// The timespan fed into the retarget, after damping and clamping.
pub fn modulated_timespan(height: i64, actual_timespan: i64, params: &ConsensusParams) -> i64 {
    let retarget_timespan = params.pow_target_timespan;
    let mut modulated = actual_timespan;

    let (min_timespan, max_timespan) = if params.digishield_difficulty_calculation {
        // Amplitude filter.
        modulated = retarget_timespan + (modulated - retarget_timespan) / 8;
        (
            retarget_timespan - retarget_timespan / 4,
            retarget_timespan + retarget_timespan / 2,
        )
    } else if height > 10_000 {
        (retarget_timespan / 4, retarget_timespan * 4)
    } else if height > 5_000 {
        (retarget_timespan / 8, retarget_timespan * 4)
    } else {
        (retarget_timespan / 16, retarget_timespan * 4)
    };

    if modulated < min_timespan {
        min_timespan
    } else if modulated > max_timespan {
        max_timespan
    } else {
        modulated
    }
}
