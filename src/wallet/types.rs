//! Core types for the wallet boundary

use serde::{Deserialize, Serialize};

use crate::wei::Wei;

/// Gas consumed by a plain value transfer on the account network
pub const SIMPLE_TRANSFER_GAS_LIMIT: u64 = 21_000;

/// The two networks the provider holds liquidity on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    /// UTXO network (BTC)
    Btc,

    /// Account-based smart-contract network (RSK, RBTC balances)
    Rsk,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Btc => "BTC",
            Network::Rsk => "RSK",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fee quote for a BTC transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeEstimation {
    /// Total fee in wei
    pub value: Wei,
}

impl FeeEstimation {
    pub fn new(value: Wei) -> Self {
        Self { value }
    }
}

/// Result of a broadcast BTC transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitcoinTransactionResult {
    pub hash: String,
}

/// Parameters for an RSK value transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionConfig {
    pub value: Wei,
    pub gas_limit: u64,
    pub gas_price: Wei,
}

impl TransactionConfig {
    pub fn new(value: Wei, gas_limit: u64, gas_price: Wei) -> Self {
        Self {
            value,
            gas_limit,
            gas_price,
        }
    }
}

/// Mined RSK transaction as reported by the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    pub gas_used: u64,
    pub gas_price: Wei,
}
