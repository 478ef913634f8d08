//! Per-run transfer results

use serde::Serialize;

use crate::error::Error;
use crate::wallet::Network;
use crate::wei::Wei;

/// What happened on one network during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransferOutcome {
    Success { tx_hash: String, amount: Wei, fee: Wei },
    SkippedNoExcess,
    SkippedNotEconomical,
    Failed { error: String },
}

/// Outcome of one leg plus its operator message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkTransferResult {
    pub network: Network,
    pub outcome: TransferOutcome,
    pub message: String,
    /// Excess came from the time-forcing window, not the threshold
    pub time_forced: bool,
}

impl NetworkTransferResult {
    pub fn success(network: Network, tx_hash: String, amount: Wei, fee: Wei, time_forced: bool) -> Self {
        Self {
            network,
            outcome: TransferOutcome::Success {
                tx_hash,
                amount,
                fee,
            },
            message: format!("{} transfer successful", network),
            time_forced,
        }
    }

    pub fn no_excess(network: Network) -> Self {
        Self {
            network,
            outcome: TransferOutcome::SkippedNoExcess,
            message: format!("No {} excess to transfer", network),
            time_forced: false,
        }
    }

    pub fn not_economical(network: Network, time_forced: bool) -> Self {
        Self {
            network,
            outcome: TransferOutcome::SkippedNotEconomical,
            message: format!(
                "{} transfer skipped - amount not economical (less than minimum fee multiplier)",
                network
            ),
            time_forced,
        }
    }

    pub fn failed(network: Network, error: &Error, time_forced: bool) -> Self {
        Self {
            network,
            outcome: TransferOutcome::Failed {
                error: error.to_string(),
            },
            message: format!("{} transfer failed", network),
            time_forced,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TransferOutcome::Success { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, TransferOutcome::Failed { .. })
    }
}

/// Both legs of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferToColdWalletResult {
    pub btc: NetworkTransferResult,
    pub rsk: NetworkTransferResult,
}

/// Failed run together with whatever legs were computed before the failure
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct TransferRunError {
    pub btc: Option<NetworkTransferResult>,
    pub rsk: Option<NetworkTransferResult>,
    #[source]
    pub source: Error,
}

impl TransferRunError {
    /// Failure before any leg was attempted
    pub fn before_transfer(source: Error) -> Self {
        Self {
            btc: None,
            rsk: None,
            source,
        }
    }

    pub fn error(&self) -> &Error {
        &self.source
    }
}
