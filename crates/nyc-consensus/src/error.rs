//! Consensus and configuration error types.

use thiserror::Error;

/// Result type for consensus rule evaluation.
pub type ConsensusResult<T> = Result<T, ConsensusError>;

/// Validation failures produced by the consensus rules.
///
/// Every variant is deterministic: evaluating the same input again
/// reproduces the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsensusError {
    /// Compact target is negative, zero, overflowed or above the pow limit.
    #[error("invalid target: nBits {bits:#010x} below minimum work")]
    InvalidTarget { bits: u32 },

    /// Hash is numerically greater than the target.
    #[error("hash doesn't match nBits")]
    InsufficientWork,

    /// Header carries another chain's merge-mining id.
    #[error("block does not have our chain ID (got {got}, expected {expected})")]
    ChainIdMismatch { got: i32, expected: i32 },

    /// Version declares an auxpow but none is attached.
    #[error("no auxpow on block with auxpow version")]
    AuxPowExpected,

    /// An auxpow is attached to a block whose version does not declare one.
    #[error("auxpow on block with non-auxpow version")]
    AuxPowUnexpected,

    /// The merge-mining proof failed its structural check.
    #[error("auxpow is not valid")]
    AuxPowInvalid,

    /// A 256-bit intermediate value would not fit, or a divisor (such as
    /// the retarget interval) is zero.
    #[error("arithmetic overflow in 256-bit target computation")]
    ArithmeticOverflow,

    /// The retarget window reaches past the available chain.
    ///
    /// Signals that the caller passed a tip the rules never reach (a
    /// precondition violation), not that a block broke a protocol rule.
    #[error("no ancestor at height {height}")]
    MissingAncestor { height: i64 },

    /// Seed text contained a non-hex character.
    #[error("malformed hex seed {input:?}")]
    ParseError { input: String },
}

/// Errors raised while loading or validating consensus parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid params json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pow limit must be non-zero")]
    InvalidPowLimit,

    #[error("invalid timespan: target {timespan}s, spacing {spacing}s")]
    InvalidTimespan { timespan: i64, spacing: i64 },

    #[error("subsidy halving interval must be non-zero")]
    ZeroHalvingInterval,

    #[error("chain params define no consensus eras")]
    NoEras,

    #[error("consensus eras must start at height 0 and ascend (offending height {height})")]
    UnsortedEras { height: u32 },
}
