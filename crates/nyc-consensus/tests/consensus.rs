use std::sync::Arc;

use nyc_consensus::compact;
use nyc_consensus::hash::hash_from_display_hex;
use nyc_consensus::params::ConsensusEra;
use nyc_consensus::{
    block_subsidy, check_auxpow_proof_of_work, check_proof_of_work, dust_fee, next_work_required,
    next_work_required_for, AuxPow, BlockHeader, BlockVersion, ChainEntry, ChainIndex, ChainParams,
    ConsensusError, ConsensusParams, FeeRate, Hash256, Network, PowHasher, RetargetAlgorithm,
    Sha256dHasher, TxOut, CENT, COIN, U256,
};

const START: i64 = 1_400_000_000;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn extend(index: &mut ChainIndex, blocks: u32, bits: u32, gap: i64) {
    for _ in 0..blocks {
        let tip = index.tip().unwrap();
        let (id, time) = (tip.id(), tip.time());
        index.insert(id, time + gap, bits).unwrap();
    }
}

/// Gravity well until height 600, digishield after.
fn two_era_schedule() -> ChainParams {
    let gravity_well = Network::Mainnet.chain_params().consensus_at(0).clone();
    let digishield = ConsensusParams {
        digishield_difficulty_calculation: true,
        retarget_algorithm: RetargetAlgorithm::Digishield,
        height_effective: 600,
        ..gravity_well.clone()
    };
    ChainParams::new(vec![
        ConsensusEra { activation_height: 0, params: gravity_well },
        ConsensusEra { activation_height: 600, params: digishield },
    ])
    .unwrap()
}

#[derive(Debug)]
struct CommittedAuxPow {
    block_hash: Hash256,
    chain_id: i32,
    parent: Hash256,
}

impl AuxPow for CommittedAuxPow {
    fn check(&self, block_hash: &Hash256, chain_id: i32, _: &ConsensusParams) -> bool {
        *block_hash == self.block_hash && chain_id == self.chain_id
    }

    fn parent_block_pow_hash(&self) -> Hash256 {
        self.parent
    }
}

#[test]
fn difficulty_follows_era_schedule() {
    init_logging();
    let schedule = two_era_schedule();

    let mut index = ChainIndex::new();
    index.insert_genesis(START, 0x1e0f_fff0);
    extend(&mut index, 598, 0x1e0f_fff0, 30);

    // Next block is 599: still the gravity well.
    let tip = index.tip().unwrap();
    let bits = next_work_required_for(&schedule, Some(tip), tip.time() + 30).unwrap();
    assert_eq!(bits, 0x1e0f_f5c6);

    // Next block is 600: digishield, on-schedule block keeps its target.
    extend(&mut index, 1, 0x1e0f_fff0, 30);
    let tip = index.tip().unwrap();
    assert_eq!(tip.height(), 599);
    let bits = next_work_required_for(&schedule, Some(tip), tip.time() + 30).unwrap();
    assert_eq!(bits, 0x1e0f_fff0);

    // A 10 second block damps to 28 seconds: 30 + (10 - 30) / 8.
    extend(&mut index, 1, 0x1e0f_fff0, 10);
    let tip = index.tip().unwrap();
    let bits = next_work_required_for(&schedule, Some(tip), tip.time() + 30).unwrap();
    let expected = compact::decode(0x1e0f_fff0).value * U256::from(28u64) / U256::from(30u64);
    assert_eq!(bits, compact::encode(&expected));
}

#[test]
fn regtest_retargets_every_interval() {
    init_logging();
    let params = Network::Regtest.chain_params().consensus_at(0).clone();
    let interval = params.difficulty_adjustment_interval() as u32;

    let mut index = ChainIndex::new();
    index.insert_genesis(START, 0x1d00_ffff);
    extend(&mut index, interval - 2, 0x1d00_ffff, 30);

    // Between retargets the tip's bits carry over.
    let tip = index.tip().unwrap();
    assert_eq!(next_work_required(Some(tip), tip.time() + 30, &params), Ok(0x1d00_ffff));

    // First retarget measures the 479 gaps back to genesis.
    extend(&mut index, 1, 0x1d00_ffff, 30);
    let tip = index.tip().unwrap();
    assert_eq!(tip.height() + 1, interval);
    let span = (tip.time() - START) as u64;
    let expected = compact::decode(0x1d00_ffff).value * U256::from(span) / U256::from(14_400u64);
    assert_eq!(
        next_work_required(Some(tip), tip.time() + 30, &params),
        Ok(compact::encode(&expected))
    );
}

#[test]
fn testnet_allows_late_min_difficulty_blocks() {
    init_logging();
    let chain = Network::Testnet.chain_params();
    let params = chain.consensus_at(0);

    let mut index = ChainIndex::new();
    index.insert_genesis(START, 0x1c0f_fff0);
    extend(&mut index, 40, 0x1c0f_fff0, 30);
    let tip = index.tip().unwrap();

    assert_eq!(
        next_work_required_for(&chain, Some(tip), tip.time() + 61),
        Ok(params.pow_limit_bits())
    );
    assert_ne!(
        next_work_required_for(&chain, Some(tip), tip.time() + 60),
        Ok(params.pow_limit_bits())
    );
}

#[test]
fn mined_header_passes_proof_of_work() {
    init_logging();
    let params = Network::Regtest.chain_params().consensus_at(0).clone();
    let bits = params.pow_limit_bits();
    assert_eq!(bits, 0x207f_ffff);

    let mut header = BlockHeader::new(
        BlockVersion::new(2, params.auxpow_chain_id),
        [0x11; 32],
        [0x22; 32],
        1_400_000_000,
        bits,
    );

    let mut found = None;
    let mut rejected = None;
    for nonce in 0..256u32 {
        header.nonce = nonce;
        match check_proof_of_work(&Sha256dHasher.pow_hash(&header), bits, &params) {
            Ok(()) => found = found.or(Some(nonce)),
            Err(err) => {
                assert_eq!(err, ConsensusError::InsufficientWork);
                rejected = rejected.or(Some(nonce));
            }
        }
    }

    header.nonce = found.unwrap();
    assert_eq!(check_auxpow_proof_of_work(&header, &Sha256dHasher, &params), Ok(()));

    header.nonce = rejected.unwrap();
    assert_eq!(
        check_auxpow_proof_of_work(&header, &Sha256dHasher, &params),
        Err(ConsensusError::InsufficientWork)
    );
}

#[test]
fn merge_mined_header_rules() {
    init_logging();
    let params = Network::Mainnet.chain_params().consensus_at(0).clone();
    let chain_id = params.auxpow_chain_id;

    let mut header = BlockHeader::new(
        BlockVersion::new(2, chain_id),
        [0x33; 32],
        [0x44; 32],
        1_400_000_000,
        0x1e0f_ffff,
    );
    header.version.set_auxpow(true);
    header.auxpow = Some(Arc::new(CommittedAuxPow {
        block_hash: header.hash(),
        chain_id,
        parent: [0u8; 32],
    }));
    assert_eq!(check_auxpow_proof_of_work(&header, &Sha256dHasher, &params), Ok(()));

    // Proof attached but the version does not declare one.
    let mut unflagged = header.clone();
    unflagged.version.set_auxpow(false);
    assert_eq!(
        check_auxpow_proof_of_work(&unflagged, &Sha256dHasher, &params),
        Err(ConsensusError::AuxPowUnexpected)
    );

    // Version declares a proof that is missing.
    let mut missing = header.clone();
    missing.auxpow = None;
    assert_eq!(
        check_auxpow_proof_of_work(&missing, &Sha256dHasher, &params),
        Err(ConsensusError::AuxPowExpected)
    );

    // Another chain's id.
    let mut foreign = header.clone();
    foreign.version.set_chain_id(0x62);
    assert_eq!(
        check_auxpow_proof_of_work(&foreign, &Sha256dHasher, &params),
        Err(ConsensusError::ChainIdMismatch { got: 0x62, expected: chain_id })
    );
}

#[test]
fn subsidy_follows_era_schedule() {
    init_logging();
    let chain = Network::Mainnet.chain_params();
    let prev =
        hash_from_display_hex("12a765e31ffd4059bada1e25190f6e98c99d9714d334efa41a195a7e7e04bfe2")
            .unwrap();
    let subsidy = |height: u32| block_subsidy(height, &prev, chain.consensus_at(height));

    assert_eq!(subsidy(1), 97_000_000 * COIN);
    assert_eq!(subsidy(50), COIN);
    assert_eq!(subsidy(101), 586_606 * COIN);
    assert_eq!(subsidy(1_000_000), 10_000 * COIN);
    // The halving era starts at 4,500,000.
    assert_eq!(subsidy(4_500_000), 10_000 * COIN);
    assert_eq!(subsidy(4_600_001), 5_000 * COIN);
    assert_eq!(subsidy(7_000_000), 50 * COIN);

    // Under the legacy params alone, 4,600,001 takes the fixed tier.
    let legacy = chain.consensus_at(0);
    assert_eq!(block_subsidy(4_600_001, &prev, legacy), 5_000 * COIN);
}

#[test]
fn dust_outputs_pay_extra() {
    let fee_rate = FeeRate::new(COIN);
    let outputs: Vec<TxOut> = [1, CENT / 2, CENT, 10 * COIN].into_iter().map(TxOut::new).collect();
    assert_eq!(dust_fee(&outputs, &fee_rate), 2 * COIN);
}

#[test]
fn schedule_loads_from_json() {
    init_logging();
    let json = r#"{
        "eras": [
            {
                "activation_height": 0,
                "params": {
                    "pow_limit": "00000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
                    "pow_target_timespan": 14400,
                    "pow_target_spacing": 30,
                    "pow_allow_min_difficulty_blocks": false,
                    "digishield_difficulty_calculation": false,
                    "strict_chain_id": true,
                    "auxpow_chain_id": 136,
                    "subsidy_halving_interval": 100000,
                    "height_effective": 1,
                    "retarget_algorithm": "classic"
                }
            }
        ]
    }"#;

    let chain = ChainParams::from_json(json).unwrap();
    let params = chain.consensus_at(12_345);
    assert_eq!(params.pow_limit_bits(), 0x1e0f_ffff);
    assert_eq!(params.difficulty_adjustment_interval(), 480);
    assert_eq!(params.retarget_algorithm, RetargetAlgorithm::Classic);
    assert_eq!(params.min_difficulty_gate_height, 157_500);
    assert_eq!(block_subsidy(900_000, &[0u8; 32], params), 10_000 * COIN);
    assert_eq!(block_subsidy(900_001, &[0u8; 32], params), 5_000 * COIN);

    assert!(ChainParams::from_json(r#"{ "eras": [] }"#).is_err());
}
