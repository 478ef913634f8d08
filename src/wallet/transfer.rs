//! Hot wallet operations used by the sweep
//!
//! Implementations live outside this crate (node RPC, signer service).
//! Every call is a blocking round-trip from the engine's point of view and
//! any failure is surfaced as an [`Error`](crate::error::Error).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::wei::Wei;

use super::types::{BitcoinTransactionResult, FeeEstimation, TransactionConfig, TransactionReceipt};

/// Exclusive access to one hot wallet
///
/// Owned by the caller and shared with every other component that moves
/// funds out of the same wallet.
pub type WalletMutex = Arc<Mutex<()>>;

/// BTC hot wallet
#[async_trait]
pub trait BitcoinWallet: Send + Sync {
    /// Estimate the fee of sending `amount` to `address`
    async fn estimate_tx_fees(&self, address: &str, amount: &Wei) -> Result<FeeEstimation>;

    /// Send `amount` to `address`
    async fn send(&self, address: &str, amount: &Wei) -> Result<BitcoinTransactionResult>;
}

/// RSK hot wallet
#[async_trait]
pub trait RootstockWallet: Send + Sync {
    /// Submit a value transfer and wait for its receipt
    async fn send_rbtc(&self, config: &TransactionConfig, to_address: &str)
        -> Result<TransactionReceipt>;
}

/// RSK node RPC
#[async_trait]
pub trait RootstockRpc: Send + Sync {
    /// Current gas price in wei
    async fn gas_price(&self) -> Result<Wei>;
}
