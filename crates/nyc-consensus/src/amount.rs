//! Currency amounts.

use serde::{Deserialize, Serialize};

/// Amount in the smallest unit.
pub type Amount = i64;

/// One coin.
pub const COIN: Amount = 100_000_000;

/// A hundredth of a coin; outputs below it are dust.
pub const CENT: Amount = 1_000_000;

/// Fee rate in units per 1000 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeRate {
    pub per_kb: Amount,
}

impl FeeRate {
    pub fn new(per_kb: Amount) -> Self {
        FeeRate { per_kb }
    }
}

/// Transaction output; only its value matters here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxOut {
    pub value: Amount,
}

impl TxOut {
    pub fn new(value: Amount) -> Self {
        TxOut { value }
    }

    pub fn is_dust(&self) -> bool {
        self.value < CENT
    }
}
