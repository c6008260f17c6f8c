//! Consensus parameters, per-height eras and built-in networks.
//!
//! Parameters are built once at startup (from a [`Network`] or from JSON)
//! and only read afterwards.

use serde::{Deserialize, Serialize};

use crate::compact::U256;
use crate::error::ConfigError;

/// Minimum tip height at which digishield-era min-difficulty blocks are
/// allowed on chains that permit them.
pub const DIGISHIELD_MIN_DIFFICULTY_HEIGHT: u32 = 157_500;

/// Which retarget algorithm runs at a retarget boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetargetAlgorithm {
    /// Kimoto gravity well over a legacy signed bignum.
    GravityWell,
    /// Per-block damped retarget (or its pre-digishield height tiers).
    Digishield,
    /// Fixed-interval retarget clamped to 4x either way.
    Classic,
}

/// Consensus rules in force for a range of heights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Easiest allowed target.
    #[serde(with = "u256_hex")]
    pub pow_limit: U256,
    /// Seconds one retarget window should take.
    pub pow_target_timespan: i64,
    /// Seconds between blocks.
    pub pow_target_spacing: i64,
    pub pow_allow_min_difficulty_blocks: bool,
    /// Damped digishield bounds instead of the height tiers.
    pub digishield_difficulty_calculation: bool,
    pub strict_chain_id: bool,
    /// Merge-mining chain id expected in block versions.
    pub auxpow_chain_id: i32,
    pub subsidy_halving_interval: u32,
    /// Height the halving subsidy schedule starts at; 0 selects the
    /// legacy randomized schedule.
    pub height_effective: u32,
    pub retarget_algorithm: RetargetAlgorithm,
    #[serde(default = "default_min_difficulty_height")]
    pub min_difficulty_gate_height: u32,
}

fn default_min_difficulty_height() -> u32 {
    DIGISHIELD_MIN_DIFFICULTY_HEIGHT
}

impl ConsensusParams {
    /// Blocks between retargets; 0 when spacing is not positive.
    pub fn difficulty_adjustment_interval(&self) -> i64 {
        if self.pow_target_spacing <= 0 {
            return 0;
        }
        self.pow_target_timespan / self.pow_target_spacing
    }

    /// Compact form of the pow limit.
    pub fn pow_limit_bits(&self) -> u32 {
        crate::compact::encode(&self.pow_limit)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pow_limit.is_zero() {
            return Err(ConfigError::InvalidPowLimit);
        }
        if self.pow_target_spacing <= 0
            || self.pow_target_timespan <= 0
            || self.difficulty_adjustment_interval() < 1
        {
            return Err(ConfigError::InvalidTimespan {
                timespan: self.pow_target_timespan,
                spacing: self.pow_target_spacing,
            });
        }
        if self.subsidy_halving_interval == 0 {
            return Err(ConfigError::ZeroHalvingInterval);
        }
        Ok(())
    }
}

/// A set of consensus params and the height it activates at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusEra {
    pub activation_height: u32,
    pub params: ConsensusParams,
}

/// The full, height-ordered consensus schedule of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    pub eras: Vec<ConsensusEra>,
}

impl ChainParams {
    /// Build from eras, validating order and each era's params.
    pub fn new(eras: Vec<ConsensusEra>) -> Result<Self, ConfigError> {
        let params = ChainParams { eras };
        params.validate()?;
        Ok(params)
    }

    /// Load a schedule from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let params: ChainParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let first = self.eras.first().ok_or(ConfigError::NoEras)?;
        if first.activation_height != 0 {
            return Err(ConfigError::UnsortedEras {
                height: first.activation_height,
            });
        }
        for pair in self.eras.windows(2) {
            if pair[1].activation_height <= pair[0].activation_height {
                return Err(ConfigError::UnsortedEras {
                    height: pair[1].activation_height,
                });
            }
        }
        for era in &self.eras {
            era.params.validate()?;
        }
        Ok(())
    }

    /// Params in force at `height`.
    pub fn consensus_at(&self, height: u32) -> &ConsensusParams {
        let idx = self
            .eras
            .partition_point(|era| era.activation_height <= height);
        // Era 0 activates at height 0, so idx >= 1 on a validated schedule.
        &self.eras[idx.saturating_sub(1)].params
    }
}

/// NewYorkCoin network type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    /// Built-in consensus schedule for this network.
    pub fn chain_params(&self) -> ChainParams {
        let eras = match self {
            Network::Mainnet => {
                let gravity_well = ConsensusParams {
                    pow_limit: U256::MAX >> 20,
                    pow_target_timespan: 30,
                    pow_target_spacing: 30,
                    pow_allow_min_difficulty_blocks: false,
                    digishield_difficulty_calculation: false,
                    strict_chain_id: true,
                    auxpow_chain_id: 0x0088,
                    subsidy_halving_interval: 500_000,
                    height_effective: 0,
                    retarget_algorithm: RetargetAlgorithm::GravityWell,
                    min_difficulty_gate_height: DIGISHIELD_MIN_DIFFICULTY_HEIGHT,
                };
                let digishield = ConsensusParams {
                    digishield_difficulty_calculation: true,
                    height_effective: 4_500_000,
                    retarget_algorithm: RetargetAlgorithm::Digishield,
                    ..gravity_well.clone()
                };
                vec![
                    ConsensusEra { activation_height: 0, params: gravity_well },
                    ConsensusEra { activation_height: 4_500_000, params: digishield },
                ]
            }
            Network::Testnet => vec![ConsensusEra {
                activation_height: 0,
                params: ConsensusParams {
                    pow_limit: U256::MAX >> 20,
                    pow_target_timespan: 30,
                    pow_target_spacing: 30,
                    pow_allow_min_difficulty_blocks: true,
                    digishield_difficulty_calculation: true,
                    strict_chain_id: false,
                    auxpow_chain_id: 0x0088,
                    subsidy_halving_interval: 500_000,
                    height_effective: 1,
                    retarget_algorithm: RetargetAlgorithm::Digishield,
                    min_difficulty_gate_height: 0,
                },
            }],
            Network::Regtest => vec![ConsensusEra {
                activation_height: 0,
                params: ConsensusParams {
                    pow_limit: U256::MAX >> 1,
                    pow_target_timespan: 4 * 60 * 60,
                    pow_target_spacing: 30,
                    pow_allow_min_difficulty_blocks: true,
                    digishield_difficulty_calculation: false,
                    strict_chain_id: true,
                    auxpow_chain_id: 0x0088,
                    subsidy_halving_interval: 150,
                    height_effective: 1,
                    retarget_algorithm: RetargetAlgorithm::Classic,
                    min_difficulty_gate_height: DIGISHIELD_MIN_DIFFICULTY_HEIGHT,
                },
            }],
        };
        ChainParams { eras }
    }

    /// Parse network from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" => Some(Network::Mainnet),
            "testnet" | "test" => Some(Network::Testnet),
            "regtest" => Some(Network::Regtest),
            _ => None,
        }
    }

    /// Get network name as string.
    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        }
    }
}

impl core::fmt::Display for Network {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Serde adapter: 256-bit values as 64-digit big-endian hex.
mod u256_hex {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::compact::U256;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(value.to_be_bytes()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let text = String::deserialize(deserializer)?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(text.trim_start_matches("0x"), &mut bytes).map_err(D::Error::custom)?;
        Ok(U256::from_be_bytes(&bytes))
    }
}
