//! Configuration records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::signing::HashFunction;
use crate::wei::Wei;

/// How far above the per-network target liquidity may drift before a sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExcessTolerance {
    /// Absolute amount added to the target
    Fixed(Wei),

    /// Percent of the target added to it (20 = 20%)
    Percentage(Decimal),
}

impl ExcessTolerance {
    /// Build from the flat operator form (`is_fixed` discriminator)
    pub fn from_parts(
        is_fixed: bool,
        fixed_value: Option<Wei>,
        percentage_value: Option<Decimal>,
    ) -> Result<Self> {
        let tolerance = if is_fixed {
            let value = fixed_value.ok_or_else(|| {
                Error::InvalidExcessTolerance("fixed tolerance without a fixed value".to_string())
            })?;
            ExcessTolerance::Fixed(value)
        } else {
            let value = percentage_value.ok_or_else(|| {
                Error::InvalidExcessTolerance(
                    "percentage tolerance without a percentage value".to_string(),
                )
            })?;
            ExcessTolerance::Percentage(value)
        };
        tolerance.validate()?;
        Ok(tolerance)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            ExcessTolerance::Fixed(_) => Ok(()),
            ExcessTolerance::Percentage(value) if value.is_sign_negative() && !value.is_zero() => {
                Err(Error::InvalidExcessTolerance(format!(
                    "percentage must not be negative, got {}",
                    value
                )))
            }
            ExcessTolerance::Percentage(_) => Ok(()),
        }
    }
}

impl std::fmt::Display for ExcessTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExcessTolerance::Fixed(value) => write!(f, "fixed {} wei", value),
            ExcessTolerance::Percentage(value) => write!(f, "{}%", value),
        }
    }
}

/// Operator configuration consumed by the sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfiguration {
    /// Target liquidity across both networks; unset or zero is invalid
    pub max_liquidity: Option<Wei>,

    pub excess_tolerance: ExcessTolerance,
}

/// Process-tracked state shared by the transfer engine and the address watcher
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateConfiguration {
    /// Last BTC sweep; `None` means no baseline exists yet
    #[serde(default)]
    pub last_btc_to_cold_wallet_transfer: Option<DateTime<Utc>>,

    /// Last RBTC sweep; `None` means no baseline exists yet
    #[serde(default)]
    pub last_rbtc_to_cold_wallet_transfer: Option<DateTime<Utc>>,

    /// Hex digest of the last BTC cold wallet address seen
    #[serde(default)]
    pub last_known_btc_cold_wallet_address_hash: Option<String>,

    /// Hex digest of the last RSK cold wallet address seen
    #[serde(default)]
    pub last_known_rsk_cold_wallet_address_hash: Option<String>,
}

impl StateConfiguration {
    /// Stored BTC address hash, empty when never recorded
    pub fn btc_address_hash(&self) -> &str {
        self.last_known_btc_cold_wallet_address_hash
            .as_deref()
            .unwrap_or_default()
    }

    /// Stored RSK address hash, empty when never recorded
    pub fn rsk_address_hash(&self) -> &str {
        self.last_known_rsk_cold_wallet_address_hash
            .as_deref()
            .unwrap_or_default()
    }
}

/// Persisted value with its integrity hash and signature (both hex)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signed<T> {
    pub value: T,
    pub hash: String,
    pub signature: String,
}

impl<T: Serialize> Signed<T> {
    /// Recompute the hash over `value` and compare it with the stored one
    pub fn verify_hash(&self, hash_function: HashFunction) -> Result<()> {
        let bytes = serde_json::to_vec(&self.value)?;
        let expected = hex::encode(hash_function(&bytes));
        if expected != self.hash {
            return Err(Error::Integrity(format!(
                "stored hash {} does not match computed {}",
                self.hash, expected
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_tolerance_from_parts() {
        let fixed = ExcessTolerance::from_parts(true, Some(Wei::from_u64(5)), None).unwrap();
        assert_eq!(fixed, ExcessTolerance::Fixed(Wei::from_u64(5)));

        let pct = ExcessTolerance::from_parts(false, None, Some(Decimal::from(20))).unwrap();
        assert_eq!(pct, ExcessTolerance::Percentage(Decimal::from(20)));

        // discriminator says fixed but only a percentage was given
        assert!(matches!(
            ExcessTolerance::from_parts(true, None, Some(Decimal::from(20))),
            Err(Error::InvalidExcessTolerance(_))
        ));
        assert!(matches!(
            ExcessTolerance::from_parts(false, None, Some(Decimal::from(-3))),
            Err(Error::InvalidExcessTolerance(_))
        ));
    }

    #[test]
    fn test_state_timestamps_keep_subseconds() {
        let state = StateConfiguration {
            last_btc_to_cold_wallet_transfer: Some(
                Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap(),
            ),
            last_rbtc_to_cold_wallet_transfer: None,
            last_known_btc_cold_wallet_address_hash: Some("abcd".to_string()),
            last_known_rsk_cold_wallet_address_hash: None,
        };

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json["lastBtcToColdWalletTransfer"],
            "2023-11-14T22:13:20.123456789Z"
        );
        assert!(json["lastRbtcToColdWalletTransfer"].is_null());

        let back: StateConfiguration = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
        assert_eq!(back.btc_address_hash(), "abcd");
        assert_eq!(back.rsk_address_hash(), "");
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let state: StateConfiguration = serde_json::from_str("{}").unwrap();
        assert_eq!(state, StateConfiguration::default());
    }
}
