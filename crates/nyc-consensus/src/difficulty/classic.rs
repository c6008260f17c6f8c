//! Classic fixed-interval retarget.

use crate::chain::ChainEntry;
use crate::error::ConsensusResult;
use crate::params::ConsensusParams;

/// New bits after a full window, with the measured timespan clamped to
/// `[T / 4, T * 4]`.
pub fn calculate<E: ChainEntry>(
    tip: E,
    first_block_time: i64,
    params: &ConsensusParams,
) -> ConsensusResult<u32> {
    let target_timespan = params.pow_target_timespan;
    let actual_timespan = (tip.time() - first_block_time)
        .max(target_timespan / 4)
        .min(target_timespan * 4);

    super::retarget(tip.bits(), actual_timespan, params)
}
