//! Canonical compact "nBits" encoding of 256-bit targets.
//!
//! The compact format packs a target into 32 bits:
//! `[size (1 byte)][sign (1 bit)][mantissa (23 bits)]`, where
//! `target = mantissa * 256^(size - 3)`.
//!
//! Targets are unsigned, so the sign bit is only reported back to the
//! caller as a "negative" flag for rejection; it never changes the value.
//! The legacy signed flavour used by the gravity-well retarget lives in
//! [`crate::bignum`] and must not be merged with this one.

// Allow clippy warnings from the uint crate's construct_uint macro
#![allow(clippy::manual_div_ceil)]
#![allow(clippy::assign_op_pattern)]

use uint::construct_uint;

use crate::error::{ConsensusError, ConsensusResult};

construct_uint! {
    /// 256-bit unsigned integer used for targets, hashes and chain work.
    pub struct U256(4);
}

/// Sign bit of the compact format.
pub const COMPACT_SIGN_BIT: u32 = 0x0080_0000;

/// Mantissa mask of the compact format (sign bit excluded).
pub const COMPACT_MANTISSA_MASK: u32 = 0x007f_ffff;

/// Result of decoding a compact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// The (possibly truncated) magnitude.
    pub value: U256,
    /// Sign bit set on a non-zero mantissa.
    pub negative: bool,
    /// The encoded value needs more than 256 bits.
    pub overflow: bool,
}

/// Convert compact "bits" to a 256-bit value with its sign/overflow flags.
pub fn decode(bits: u32) -> Decoded {
    let size = bits >> 24;
    let mut word = bits & COMPACT_MANTISSA_MASK;

    let value = if size <= 3 {
        word >>= 8 * (3 - size);
        U256::from(word)
    } else {
        let shift = 8 * (size as usize - 3);
        if shift >= 256 {
            U256::zero()
        } else {
            U256::from(word) << shift
        }
    };

    let negative = word != 0 && (bits & COMPACT_SIGN_BIT) != 0;
    let overflow = word != 0
        && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));

    Decoded {
        value,
        negative,
        overflow,
    }
}

/// Convert a 256-bit value back to compact "bits".
///
/// When the top mantissa bit would collide with the sign bit the
/// mantissa is shifted down a byte and the size bumped, so the result
/// never reads as negative.
pub fn encode(value: &U256) -> u32 {
    let mut size = (value.bits() as u32 + 7) / 8;
    let mut compact = if size <= 3 {
        (value.low_u64() << (8 * (3 - size))) as u32
    } else {
        (*value >> (8 * (size as usize - 3))).low_u64() as u32
    };

    if compact & COMPACT_SIGN_BIT != 0 {
        compact >>= 8;
        size += 1;
    }

    compact | (size << 24)
}

/// Decode `bits` into a usable target.
///
/// Returns `None` for negative, zero or overflowed encodings.
pub fn target_from_bits(bits: u32) -> Option<U256> {
    let decoded = decode(bits);
    if decoded.negative || decoded.overflow || decoded.value.is_zero() {
        return None;
    }
    Some(decoded.value)
}

impl U256 {
    /// Interpret a hash in internal (little-endian) byte order.
    #[inline]
    pub fn from_hash(hash: &[u8; 32]) -> Self {
        U256::from_little_endian(hash)
    }

    /// Serialize to big-endian bytes.
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        self.to_big_endian(&mut bytes);
        bytes
    }

    /// Deserialize from big-endian bytes.
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        U256::from_big_endian(bytes)
    }

    /// Multiply by a scalar, failing instead of wrapping.
    pub fn checked_mul_u64(&self, rhs: u64) -> ConsensusResult<U256> {
        self.checked_mul(U256::from(rhs))
            .ok_or(ConsensusError::ArithmeticOverflow)
    }

    /// Divide by a scalar; a zero divisor is reported as overflow.
    pub fn checked_div_u64(&self, rhs: u64) -> ConsensusResult<U256> {
        self.checked_div(U256::from(rhs))
            .ok_or(ConsensusError::ArithmeticOverflow)
    }
}

/// Check if a hash meets the target (`hash <= target`).
#[inline]
pub fn hash_meets_target(hash: &[u8; 32], target: &U256) -> bool {
    U256::from_hash(hash) <= *target
}
