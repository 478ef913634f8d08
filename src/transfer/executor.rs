//! Per-network transfer strategies
//!
//! An executor turns a positive excess into either an executed transfer or
//! a "not economical" decision. It never persists state or publishes
//! events; the orchestrator does both.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::Result;
use crate::wallet::{
    BitcoinWallet, Network, RootstockRpc, RootstockWallet, TransactionConfig,
    SIMPLE_TRANSFER_GAS_LIMIT,
};
use crate::wei::Wei;

/// Decision taken by an executor for a positive excess
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegOutcome {
    Transferred { tx_hash: String, amount: Wei, fee: Wei },
    NotEconomical,
}

#[async_trait]
pub trait TransferExecutor: Send + Sync {
    fn network(&self) -> Network;

    /// Move `excess` (or what is left of it after fees) to `address`
    async fn execute(&self, address: &str, excess: &Wei) -> Result<LegOutcome>;
}

/// BTC leg: viable when `excess >= estimated fee * multiplier`
pub struct BtcTransferExecutor {
    wallet: Arc<dyn BitcoinWallet>,
    min_fee_multiplier: u64,
}

impl BtcTransferExecutor {
    pub fn new(wallet: Arc<dyn BitcoinWallet>, min_fee_multiplier: u64) -> Self {
        Self {
            wallet,
            min_fee_multiplier,
        }
    }
}

#[async_trait]
impl TransferExecutor for BtcTransferExecutor {
    fn network(&self) -> Network {
        Network::Btc
    }

    async fn execute(&self, address: &str, excess: &Wei) -> Result<LegOutcome> {
        let estimation = self.wallet.estimate_tx_fees(address, excess).await?;
        let minimum = estimation.value.checked_mul_u64(self.min_fee_multiplier)?;

        if *excess < minimum {
            info!(
                "BTC excess {} below economic minimum {} (fee {} x {})",
                excess, minimum, estimation.value, self.min_fee_multiplier
            );
            return Ok(LegOutcome::NotEconomical);
        }

        let sent = self.wallet.send(address, excess).await?;
        info!("Sent {} wei BTC to cold wallet: {}", excess, sent.hash);

        // The estimate is what the viability gate was evaluated against
        Ok(LegOutcome::Transferred {
            tx_hash: sent.hash,
            amount: *excess,
            fee: estimation.value,
        })
    }
}

/// RSK leg: pays gas out of the excess, viable when what is left is at
/// least `gas cost * multiplier`
pub struct RskTransferExecutor {
    wallet: Arc<dyn RootstockWallet>,
    rpc: Arc<dyn RootstockRpc>,
    min_fee_multiplier: u64,
}

impl RskTransferExecutor {
    pub fn new(
        wallet: Arc<dyn RootstockWallet>,
        rpc: Arc<dyn RootstockRpc>,
        min_fee_multiplier: u64,
    ) -> Self {
        Self {
            wallet,
            rpc,
            min_fee_multiplier,
        }
    }
}

#[async_trait]
impl TransferExecutor for RskTransferExecutor {
    fn network(&self) -> Network {
        Network::Rsk
    }

    async fn execute(&self, address: &str, excess: &Wei) -> Result<LegOutcome> {
        let gas_price = self.rpc.gas_price().await?;
        let gas_cost = gas_price.checked_mul_u64(SIMPLE_TRANSFER_GAS_LIMIT)?;

        let amount = match excess.checked_sub(&gas_cost) {
            Ok(amount) => amount,
            Err(_) => {
                info!("RBTC excess {} does not cover gas cost {}", excess, gas_cost);
                return Ok(LegOutcome::NotEconomical);
            }
        };

        let minimum = gas_cost.checked_mul_u64(self.min_fee_multiplier)?;
        if amount < minimum {
            info!(
                "RBTC amount {} below economic minimum {} (gas cost {} x {})",
                amount, minimum, gas_cost, self.min_fee_multiplier
            );
            return Ok(LegOutcome::NotEconomical);
        }

        let config = TransactionConfig::new(amount, SIMPLE_TRANSFER_GAS_LIMIT, gas_price);
        let receipt = self.wallet.send_rbtc(&config, address).await?;

        // Charged fee, which may differ from the quote
        let fee = receipt.gas_price.checked_mul_u64(receipt.gas_used)?;
        debug!(
            "RBTC receipt {}: gas used {} at {}",
            receipt.transaction_hash, receipt.gas_used, receipt.gas_price
        );
        info!(
            "Sent {} wei RBTC to cold wallet: {}",
            amount, receipt.transaction_hash
        );

        Ok(LegOutcome::Transferred {
            tx_hash: receipt.transaction_hash,
            amount,
            fee,
        })
    }
}
