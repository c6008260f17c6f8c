//! Signed big numbers with the legacy MPI-flavoured compact encoding.
//!
//! Historic gravity-well retargets were computed on a signed OpenSSL-style
//! bignum, where the compact sign bit marks a truly negative value and
//! the running average may briefly go negative between steps. Replaying
//! those blocks needs the same signed arithmetic, so this type stays
//! separate from the canonical unsigned [`crate::compact`] codec.

use core::cmp::Ordering;
use core::ops::{Add, Mul, Neg, Sub};

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{Signed, ToPrimitive, Zero};

use crate::compact::{U256, COMPACT_MANTISSA_MASK, COMPACT_SIGN_BIT};

/// Signed arbitrary-precision integer.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct LegacyBigNum(BigInt);

impl LegacyBigNum {
    pub fn zero() -> Self {
        LegacyBigNum(BigInt::zero())
    }

    /// Decode legacy compact bits; the sign bit negates the value.
    pub fn from_legacy_compact(compact: u32) -> Self {
        let size = compact >> 24;
        let negative = compact & COMPACT_SIGN_BIT != 0;
        let mut word = compact & COMPACT_MANTISSA_MASK;

        let magnitude = if size <= 3 {
            word >>= 8 * (3 - size);
            BigUint::from(word)
        } else {
            BigUint::from(word) << (8 * (size as usize - 3))
        };

        let sign = if negative { Sign::Minus } else { Sign::Plus };
        LegacyBigNum(BigInt::from_biguint(sign, magnitude))
    }

    /// Encode to legacy compact bits, carrying the sign in bit 23.
    pub fn to_legacy_compact(&self) -> u32 {
        let magnitude = self.0.magnitude();
        let mut size = ((magnitude.bits() + 7) / 8) as u32;

        let mut compact = if size <= 3 {
            low_u32(magnitude) << (8 * (3 - size))
        } else {
            low_u32(&(magnitude >> (8 * (size as usize - 3))))
        };

        if compact & COMPACT_SIGN_BIT != 0 {
            compact >>= 8;
            size += 1;
        }

        compact |= size << 24;
        if self.0.is_negative() {
            compact |= COMPACT_SIGN_BIT;
        }
        compact
    }

    pub fn from_u256(value: &U256) -> Self {
        LegacyBigNum(BigInt::from_biguint(
            Sign::Plus,
            BigUint::from_bytes_be(&value.to_be_bytes()),
        ))
    }

    /// Convert back to an unsigned 256-bit value.
    ///
    /// `None` when negative or wider than 256 bits.
    pub fn to_u256(&self) -> Option<U256> {
        if self.0.is_negative() || self.0.bits() > 256 {
            return None;
        }
        let bytes = self.0.magnitude().to_bytes_be();
        let mut buf = [0u8; 32];
        buf[32 - bytes.len()..].copy_from_slice(&bytes);
        Some(U256::from_be_bytes(&buf))
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Number of significant bits of the magnitude.
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    /// Truncating division toward zero, the way `BN_div` rounds.
    ///
    /// Division by zero yields `None`.
    pub fn checked_div(&self, divisor: i64) -> Option<Self> {
        if divisor == 0 {
            return None;
        }
        Some(LegacyBigNum(&self.0 / BigInt::from(divisor)))
    }
}

/// Low 32 bits of an unsigned magnitude.
fn low_u32(value: &BigUint) -> u32 {
    (value & BigUint::from(u32::MAX)).to_u32().unwrap_or_default()
}

impl Add for LegacyBigNum {
    type Output = LegacyBigNum;

    fn add(self, rhs: LegacyBigNum) -> LegacyBigNum {
        LegacyBigNum(self.0 + rhs.0)
    }
}

impl Sub for LegacyBigNum {
    type Output = LegacyBigNum;

    fn sub(self, rhs: LegacyBigNum) -> LegacyBigNum {
        LegacyBigNum(self.0 - rhs.0)
    }
}

impl Neg for LegacyBigNum {
    type Output = LegacyBigNum;

    fn neg(self) -> LegacyBigNum {
        LegacyBigNum(-self.0)
    }
}

impl Mul<i64> for LegacyBigNum {
    type Output = LegacyBigNum;

    fn mul(self, rhs: i64) -> LegacyBigNum {
        LegacyBigNum(self.0 * rhs)
    }
}

impl PartialEq<U256> for LegacyBigNum {
    fn eq(&self, other: &U256) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd<U256> for LegacyBigNum {
    fn partial_cmp(&self, other: &U256) -> Option<Ordering> {
        Some(self.cmp(&LegacyBigNum::from_u256(other)))
    }
}
