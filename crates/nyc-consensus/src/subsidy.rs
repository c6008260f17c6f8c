//! Block subsidy schedule and the dust fee.
//!
//! Two regimes exist. Chains whose params have `height_effective == 0`
//! replay the legacy schedule, which draws most early rewards from a
//! Mersenne Twister seeded with seven hex digits of the previous block
//! hash. Every other chain follows a fixed step-down table keyed on the
//! halving interval.

use log::trace;

use crate::amount::{Amount, FeeRate, TxOut, COIN};
use crate::hash::{hash_to_display_hex, Hash256};
use crate::mt::generate_mt_random;
use crate::params::ConsensusParams;
use crate::seed::seed_from_display_hex;

/// Largest per-block reward.
pub const MAX_SUBSIDY: Amount = 10_000 * COIN;

/// Smallest per-block reward.
pub const MIN_SUBSIDY: Amount = 50 * COIN;

/// One-time reward of block 1 on the legacy chain.
pub const PREMINE_SUBSIDY: Amount = 97_000_000 * COIN;

/// Hex digits of the previous hash used as the generator seed.
const SEED_LEN: usize = 7;

/// Randomised legacy band: heights below `end` draw `1 + rand(1..=bound)`
/// coins, seeded at `offset` in the previous hash's display hex.
struct RandomBand {
    end: u32,
    offset: usize,
    bound: u32,
}

// The offset alternates between bands; paid-out history depends on it.
const RANDOM_BANDS: [RandomBand; 6] = [
    RandomBand { end: 100_000, offset: 7, bound: 999_999 },
    RandomBand { end: 200_000, offset: 7, bound: 499_999 },
    RandomBand { end: 300_000, offset: 6, bound: 249_999 },
    RandomBand { end: 400_000, offset: 7, bound: 124_999 },
    RandomBand { end: 500_000, offset: 7, bound: 62_499 },
    RandomBand { end: 600_000, offset: 6, bound: 31_249 },
];

/// Fixed legacy rewards for heights strictly above each threshold, first
/// match wins. The first row covers every later one.
const FIXED_TIERS: [(u32, Amount); 6] = [
    (4_600_000, MAX_SUBSIDY / 2),
    (5_000_000, MAX_SUBSIDY / 4),
    (5_500_000, MAX_SUBSIDY / 8),
    (6_000_000, MAX_SUBSIDY / 16),
    (6_500_000, MIN_SUBSIDY * 2),
    (7_000_000, MIN_SUBSIDY),
];

/// Reward for the block at `height` whose parent hash is `prev_hash`.
pub fn block_subsidy(height: u32, prev_hash: &Hash256, params: &ConsensusParams) -> Amount {
    if params.height_effective == 0 {
        legacy_subsidy(height, prev_hash)
    } else {
        halving_subsidy(height, params.subsidy_halving_interval)
    }
}

/// The legacy schedule.
pub fn legacy_subsidy(height: u32, prev_hash: &Hash256) -> Amount {
    match height {
        1 => return PREMINE_SUBSIDY,
        2..=100 => return COIN,
        _ => {}
    }

    if let Some(band) = RANDOM_BANDS.iter().find(|band| height < band.end) {
        let seed = seed_from_display_hex(&hash_to_display_hex(prev_hash), band.offset, SEED_LEN);
        let draw = generate_mt_random(seed, band.bound);
        trace!(
            "legacy subsidy at {}: seed {:#x}, bound {}, draw {}",
            height,
            seed,
            band.bound,
            draw
        );
        return (1 + draw as Amount) * COIN;
    }

    FIXED_TIERS
        .iter()
        .find(|(threshold, _)| height > *threshold)
        .map_or(MAX_SUBSIDY, |(_, subsidy)| *subsidy)
}

/// The step-down schedule. The first boundary, `9 * interval`, still pays
/// the maximum.
pub fn halving_subsidy(height: u32, interval: u32) -> Amount {
    let height = height as u64;
    let interval = interval as u64;

    if height <= 9 * interval {
        return MAX_SUBSIDY;
    }
    const STEPS: [(u64, Amount); 5] = [
        (10, 5_000 * COIN),
        (11, 2_500 * COIN),
        (12, 1_250 * COIN),
        (13, 625 * COIN),
        (14, 100 * COIN),
    ];
    STEPS
        .iter()
        .find(|(multiple, _)| height < multiple * interval)
        .map_or(MIN_SUBSIDY, |(_, subsidy)| *subsidy)
}

/// Extra fee of one `fee_rate.per_kb` for every dust output.
pub fn dust_fee(outputs: &[TxOut], fee_rate: &FeeRate) -> Amount {
    outputs
        .iter()
        .filter(|output| output.is_dust())
        .map(|_| fee_rate.per_kb)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::CENT;
    use crate::hash::hash_from_display_hex;
    use crate::params::Network;

    const PREV: &str = "12a765e31ffd4059bada1e25190f6e98c99d9714d334efa41a195a7e7e04bfe2";

    fn prev() -> Hash256 {
        hash_from_display_hex(PREV).unwrap()
    }

    fn legacy_params() -> ConsensusParams {
        Network::Mainnet.chain_params().consensus_at(0).clone()
    }

    fn halving_params() -> ConsensusParams {
        Network::Mainnet.chain_params().consensus_at(4_500_000).clone()
    }

    #[test]
    fn test_premine_heights() {
        let params = legacy_params();
        assert_eq!(block_subsidy(1, &prev(), &params), 97_000_000 * COIN);
        assert_eq!(block_subsidy(2, &prev(), &params), COIN);
        assert_eq!(block_subsidy(50, &prev(), &params), COIN);
        assert_eq!(block_subsidy(100, &prev(), &params), COIN);
    }

    #[test]
    fn test_random_bands() {
        let params = legacy_params();
        let prev = prev();
        // Offset 7 reads "31ffd40", offset 6 reads "e31ffd4".
        assert_eq!(block_subsidy(0, &prev, &params), 586_606 * COIN);
        assert_eq!(block_subsidy(101, &prev, &params), 586_606 * COIN);
        assert_eq!(block_subsidy(99_999, &prev, &params), 586_606 * COIN);
        assert_eq!(block_subsidy(100_000, &prev, &params), 293_270 * COIN);
        assert_eq!(block_subsidy(250_000, &prev, &params), 164_991 * COIN);
        assert_eq!(block_subsidy(399_999, &prev, &params), 73_310 * COIN);
        assert_eq!(block_subsidy(400_000, &prev, &params), 36_656 * COIN);
        assert_eq!(block_subsidy(599_999, &prev, &params), 20_624 * COIN);
    }

    #[test]
    fn test_zero_hash_seed() {
        // "0000000" seeds the generator with 0.
        let params = legacy_params();
        assert_eq!(block_subsidy(5_000, &[0u8; 32], &params), 548_939 * COIN);
    }

    #[test]
    fn test_fixed_tiers() {
        let params = legacy_params();
        let prev = prev();
        assert_eq!(block_subsidy(600_000, &prev, &params), MAX_SUBSIDY);
        assert_eq!(block_subsidy(4_600_000, &prev, &params), MAX_SUBSIDY);
        assert_eq!(block_subsidy(4_600_001, &prev, &params), MAX_SUBSIDY / 2);
        // Later thresholds never match.
        assert_eq!(block_subsidy(5_000_001, &prev, &params), MAX_SUBSIDY / 2);
        assert_eq!(block_subsidy(7_000_001, &prev, &params), MAX_SUBSIDY / 2);
        assert_eq!(block_subsidy(u32::MAX, &prev, &params), MAX_SUBSIDY / 2);
    }

    #[test]
    fn test_halving_schedule() {
        let params = halving_params();
        let prev = prev();
        let interval = params.subsidy_halving_interval;
        assert_eq!(interval, 500_000);

        assert_eq!(block_subsidy(1, &prev, &params), 10_000 * COIN);
        assert_eq!(block_subsidy(9 * interval, &prev, &params), 10_000 * COIN);
        assert_eq!(block_subsidy(9 * interval + 1, &prev, &params), 5_000 * COIN);
        assert_eq!(block_subsidy(10 * interval, &prev, &params), 2_500 * COIN);
        assert_eq!(block_subsidy(11 * interval, &prev, &params), 1_250 * COIN);
        assert_eq!(block_subsidy(12 * interval, &prev, &params), 625 * COIN);
        assert_eq!(block_subsidy(13 * interval, &prev, &params), 100 * COIN);
        assert_eq!(block_subsidy(14 * interval - 1, &prev, &params), 100 * COIN);
        assert_eq!(block_subsidy(14 * interval, &prev, &params), 50 * COIN);
        assert_eq!(block_subsidy(u32::MAX, &prev, &params), 50 * COIN);
    }

    #[test]
    fn test_halving_ignores_prev_hash() {
        let params = halving_params();
        assert_eq!(
            block_subsidy(5_200_000, &prev(), &params),
            block_subsidy(5_200_000, &[0xab; 32], &params)
        );
    }

    #[test]
    fn test_deterministic() {
        let params = legacy_params();
        let first = block_subsidy(123_456, &prev(), &params);
        for _ in 0..3 {
            assert_eq!(block_subsidy(123_456, &prev(), &params), first);
        }
    }

    #[test]
    fn test_dust_fee() {
        let fee_rate = FeeRate::new(100_000);
        let outputs = [
            TxOut::new(CENT - 1),
            TxOut::new(CENT),
            TxOut::new(0),
            TxOut::new(5 * COIN),
        ];
        assert_eq!(dust_fee(&outputs, &fee_rate), 200_000);
        assert_eq!(dust_fee(&[], &fee_rate), 0);
        assert_eq!(dust_fee(&outputs[1..2], &fee_rate), 0);
    }
}
