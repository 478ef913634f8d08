//! Excess calculation
//!
//! Pure functions of configuration, current balance and last transfer
//! time. Both networks share one target (`max_liquidity / 2`) and one
//! threshold (target plus tolerance).
//!
//! ```text
//!   balance > threshold                 -> excess = balance - target
//!   stale (>= force window) and > target -> excess = balance - target, time forced
//!   otherwise                           -> no excess
//! ```

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::liquidity::{ExcessTolerance, GeneralConfiguration};
use crate::wei::Wei;

/// Per-network target and sweep threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub target: Wei,
    pub threshold: Wei,
}

impl Thresholds {
    /// Validate the general configuration and derive target and threshold
    pub fn from_configuration(general: &GeneralConfiguration) -> Result<Self> {
        let max_liquidity = general
            .max_liquidity
            .filter(|max| !max.is_zero())
            .ok_or(Error::NoMaxLiquidityConfigured)?;
        general.excess_tolerance.validate()?;

        let target = max_liquidity.checked_div(&Wei::from_u64(2))?;
        let threshold = match &general.excess_tolerance {
            ExcessTolerance::Fixed(value) => target.checked_add(value)?,
            ExcessTolerance::Percentage(percentage) => target.increase_by_percentage(*percentage)?,
        };

        Ok(Self { target, threshold })
    }
}

/// Amount to sweep from one network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Excess {
    pub amount: Wei,
    pub time_forced: bool,
}

impl Excess {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

/// Excess for one network, falling back to time forcing
///
/// A `last_transfer` in the future never counts as stale.
pub fn excess_with_time_forcing(
    thresholds: &Thresholds,
    current: &Wei,
    last_transfer: DateTime<Utc>,
    now: DateTime<Utc>,
    force_transfer_after_seconds: u64,
) -> Result<Excess> {
    if *current > thresholds.threshold {
        return Ok(Excess {
            amount: current.checked_sub(&thresholds.target)?,
            time_forced: false,
        });
    }

    let elapsed = (now - last_transfer).num_seconds();
    let window = i64::try_from(force_transfer_after_seconds).unwrap_or(i64::MAX);
    if elapsed >= window && *current > thresholds.target {
        debug!(
            "Time forcing: {}s since last transfer (window {}s), balance {} over target {}",
            elapsed, window, current, thresholds.target
        );
        return Ok(Excess {
            amount: current.checked_sub(&thresholds.target)?,
            time_forced: true,
        });
    }

    Ok(Excess::none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;

    const WEEK: u64 = 604_800;

    fn general(max: u64, tolerance: ExcessTolerance) -> GeneralConfiguration {
        GeneralConfiguration {
            max_liquidity: Some(Wei::from_ether(max)),
            excess_tolerance: tolerance,
        }
    }

    fn pct(value: i64) -> ExcessTolerance {
        ExcessTolerance::Percentage(Decimal::from(value))
    }

    fn ether_tenths(tenths: u64) -> Wei {
        Wei::from_u64(tenths)
            .checked_mul(&Wei::from_u64(100_000_000_000_000_000))
            .unwrap()
    }

    #[test]
    fn test_thresholds_percentage() {
        let t = Thresholds::from_configuration(&general(40, pct(20))).unwrap();
        assert_eq!(t.target, Wei::from_ether(20));
        assert_eq!(t.threshold, Wei::from_ether(24));
    }

    #[test]
    fn test_thresholds_fixed() {
        let t = Thresholds::from_configuration(&general(
            40,
            ExcessTolerance::Fixed(Wei::from_ether(3)),
        ))
        .unwrap();
        assert_eq!(t.target, Wei::from_ether(20));
        assert_eq!(t.threshold, Wei::from_ether(23));
        assert!(t.threshold >= t.target);
    }

    #[test]
    fn test_thresholds_reject_missing_or_zero_max() {
        let mut config = general(40, pct(20));
        config.max_liquidity = None;
        assert!(matches!(
            Thresholds::from_configuration(&config),
            Err(Error::NoMaxLiquidityConfigured)
        ));

        config.max_liquidity = Some(Wei::zero());
        assert!(matches!(
            Thresholds::from_configuration(&config),
            Err(Error::NoMaxLiquidityConfigured)
        ));
    }

    #[test]
    fn test_thresholds_reject_negative_percentage() {
        assert!(matches!(
            Thresholds::from_configuration(&general(40, pct(-5))),
            Err(Error::InvalidExcessTolerance(_))
        ));
    }

    #[test]
    fn test_threshold_excess() {
        let t = Thresholds::from_configuration(&general(40, pct(20))).unwrap();
        let now = Utc::now();

        let excess = excess_with_time_forcing(&t, &ether_tenths(245), now, now, WEEK).unwrap();
        assert_eq!(excess.amount, ether_tenths(45));
        assert!(!excess.time_forced);
    }

    #[test]
    fn test_no_excess_within_band() {
        let t = Thresholds::from_configuration(&general(40, pct(20))).unwrap();
        let now = Utc::now();

        // exactly at threshold is not above it
        let excess = excess_with_time_forcing(&t, &Wei::from_ether(24), now, now, WEEK).unwrap();
        assert_eq!(excess, Excess::none());

        let excess = excess_with_time_forcing(&t, &Wei::from_ether(21), now, now, WEEK).unwrap();
        assert!(excess.is_zero());
    }

    #[test]
    fn test_time_forcing_sweeps_to_target() {
        let t = Thresholds::from_configuration(&general(40, pct(20))).unwrap();
        let now = Utc::now();
        let stale = now - Duration::seconds(WEEK as i64);

        let excess = excess_with_time_forcing(&t, &Wei::from_ether(21), stale, now, WEEK).unwrap();
        assert_eq!(excess.amount, Wei::from_ether(1));
        assert!(excess.time_forced);

        // one second short of the window
        let recent = now - Duration::seconds(WEEK as i64 - 1);
        let excess = excess_with_time_forcing(&t, &Wei::from_ether(21), recent, now, WEEK).unwrap();
        assert!(excess.is_zero());
    }

    #[test]
    fn test_time_forcing_needs_balance_above_target() {
        let t = Thresholds::from_configuration(&general(40, pct(20))).unwrap();
        let now = Utc::now();
        let stale = now - Duration::days(30);

        let excess = excess_with_time_forcing(&t, &Wei::from_ether(20), stale, now, WEEK).unwrap();
        assert_eq!(excess, Excess::none());
    }

    #[test]
    fn test_future_last_transfer_is_not_stale() {
        let t = Thresholds::from_configuration(&general(40, pct(20))).unwrap();
        let now = Utc::now();

        let excess = excess_with_time_forcing(
            &t,
            &Wei::from_ether(21),
            now + Duration::days(30),
            now,
            WEEK,
        )
        .unwrap();
        assert!(excess.is_zero());
    }
}
