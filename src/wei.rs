//! Wei amounts
//!
//! Smallest indivisible unit of either network's currency. BTC balances are
//! expressed in wei as well (1 BTC = 10^18 wei) so both legs share one type.
//! Every operation that could go negative, overflow or divide by zero is
//! checked and reports a [`WeiError`].

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Wei per whole coin (10^18)
pub const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

/// Arithmetic failures on [`Wei`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeiError {
    #[error("subtraction underflow: {minuend} - {subtrahend}")]
    Underflow { minuend: String, subtrahend: String },

    #[error("overflow")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("negative percentage: {0}")]
    NegativePercentage(Decimal),

    #[error("invalid amount: {0}")]
    Parse(String),
}

/// Non-negative arbitrary amount in wei
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Wei(U256);

impl Wei {
    pub const fn zero() -> Self {
        Wei(U256::ZERO)
    }

    pub fn from_u64(value: u64) -> Self {
        Wei(U256::from(value))
    }

    /// Whole coins to wei
    pub fn from_ether(value: u64) -> Self {
        Wei(U256::from(value) * U256::from(WEI_PER_ETHER))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(&self, other: &Wei) -> Result<Wei, WeiError> {
        self.0
            .checked_add(other.0)
            .map(Wei)
            .ok_or(WeiError::Overflow)
    }

    pub fn checked_sub(&self, other: &Wei) -> Result<Wei, WeiError> {
        self.0
            .checked_sub(other.0)
            .map(Wei)
            .ok_or_else(|| WeiError::Underflow {
                minuend: self.to_string(),
                subtrahend: other.to_string(),
            })
    }

    pub fn checked_mul(&self, other: &Wei) -> Result<Wei, WeiError> {
        self.0
            .checked_mul(other.0)
            .map(Wei)
            .ok_or(WeiError::Overflow)
    }

    pub fn checked_mul_u64(&self, factor: u64) -> Result<Wei, WeiError> {
        self.checked_mul(&Wei::from_u64(factor))
    }

    pub fn checked_div(&self, other: &Wei) -> Result<Wei, WeiError> {
        if other.is_zero() {
            return Err(WeiError::DivisionByZero);
        }
        Ok(Wei(self.0 / other.0))
    }

    /// `self + floor(self * percentage / 100)`
    ///
    /// The percentage is applied exactly on the integer through the
    /// decimal's mantissa and scale, so no precision is lost for large
    /// balances.
    pub fn increase_by_percentage(&self, percentage: Decimal) -> Result<Wei, WeiError> {
        if percentage.is_sign_negative() && !percentage.is_zero() {
            return Err(WeiError::NegativePercentage(percentage));
        }

        let mantissa = U256::from(percentage.mantissa().unsigned_abs());
        let mut denominator = U256::from(100u64);
        for _ in 0..percentage.scale() {
            denominator = denominator.checked_mul(U256::from(10u64)).ok_or(WeiError::Overflow)?;
        }

        let increase = self
            .0
            .checked_mul(mantissa)
            .ok_or(WeiError::Overflow)?
            / denominator;

        self.checked_add(&Wei(increase))
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Wei {
    type Err = WeiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(WeiError::Parse(s.to_string()));
        }
        U256::from_str_radix(trimmed, 10)
            .map(Wei)
            .map_err(|e| WeiError::Parse(format!("{}: {}", s, e)))
    }
}

impl From<u64> for Wei {
    fn from(value: u64) -> Self {
        Wei::from_u64(value)
    }
}

// Decimal strings on the wire, never JSON numbers (they lose precision)
impl Serialize for Wei {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Wei {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
