//! Excess-to-cold-wallet sweep
//!
//! One call to [`TransferExcessToColdWallet::run`] validates configuration,
//! computes the excess on both networks, runs the BTC leg then the RSK leg,
//! and on success records the new transfer timestamps in the signed state
//! and publishes one event per executed transfer.
//!
//! Both hot wallet locks are held for the whole run, BTC first.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::config::TransferConfig;
use crate::error::{Error, UseCaseId};
use crate::events::{ColdWalletEvent, EventBus, TransferEventData};
use crate::liquidity::{
    ConfigurationProvider, LiquidityProviderRepository, PeginLiquidityProvider,
    PegoutLiquidityProvider,
};
use crate::signing::{sign_configuration, HashFunction, Signer};
use crate::wallet::{ColdWallet, WalletMutex};

use super::excess::{excess_with_time_forcing, Excess, Thresholds};
use super::executor::{LegOutcome, TransferExecutor};
use super::result::{
    NetworkTransferResult, TransferOutcome, TransferRunError, TransferToColdWalletResult,
};

type RunResult<T> = std::result::Result<T, TransferRunError>;

/// Tuning knobs of the sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSettings {
    pub force_transfer_after_seconds: u64,
}

impl From<&TransferConfig> for TransferSettings {
    fn from(config: &TransferConfig) -> Self {
        Self {
            force_transfer_after_seconds: config.force_transfer_after_seconds,
        }
    }
}

/// Everything the sweep talks to
#[derive(Clone)]
pub struct TransferCollaborators {
    pub pegin_provider: Arc<dyn PeginLiquidityProvider>,
    pub pegout_provider: Arc<dyn PegoutLiquidityProvider>,
    pub configuration: Arc<dyn ConfigurationProvider>,
    pub repository: Arc<dyn LiquidityProviderRepository>,
    pub cold_wallet: Arc<dyn ColdWallet>,
    pub btc_executor: Arc<dyn TransferExecutor>,
    pub rsk_executor: Arc<dyn TransferExecutor>,
    pub btc_wallet_mutex: WalletMutex,
    pub rsk_wallet_mutex: WalletMutex,
    pub event_bus: Arc<dyn EventBus>,
    pub signer: Arc<dyn Signer>,
    pub hash_function: HashFunction,
}

pub struct TransferExcessToColdWallet {
    deps: TransferCollaborators,
    settings: TransferSettings,
}

fn fail(e: Error) -> TransferRunError {
    TransferRunError::before_transfer(e.wrap(UseCaseId::TransferExcessToColdWallet))
}

impl TransferExcessToColdWallet {
    pub fn new(deps: TransferCollaborators, settings: TransferSettings) -> Self {
        Self { deps, settings }
    }

    /// Run one sweep
    ///
    /// A failed leg stops the run: the RSK leg is not attempted after a BTC
    /// failure and nothing is persisted. Skipped legs are not failures.
    pub async fn run(&self) -> RunResult<TransferToColdWalletResult> {
        let _btc_guard = self.deps.btc_wallet_mutex.lock().await;
        let _rsk_guard = self.deps.rsk_wallet_mutex.lock().await;

        let (btc_address, rsk_address) = self.cold_wallet_addresses().map_err(fail)?;
        let (thresholds, last_btc, last_rbtc) =
            self.validated_configuration().await.map_err(fail)?;

        let btc_liquidity = self
            .deps
            .pegout_provider
            .available_pegout_liquidity()
            .await
            .map_err(fail)?;
        let rbtc_liquidity = self
            .deps
            .pegin_provider
            .available_pegin_liquidity()
            .await
            .map_err(fail)?;

        let now = Utc::now();
        let force_after = self.settings.force_transfer_after_seconds;
        let btc_excess =
            excess_with_time_forcing(&thresholds, &btc_liquidity, last_btc, now, force_after)
                .map_err(fail)?;
        let rsk_excess =
            excess_with_time_forcing(&thresholds, &rbtc_liquidity, last_rbtc, now, force_after)
                .map_err(fail)?;

        debug!(
            "Target {} threshold {} | BTC {} (excess {}) | RBTC {} (excess {})",
            thresholds.target,
            thresholds.threshold,
            btc_liquidity,
            btc_excess.amount,
            rbtc_liquidity,
            rsk_excess.amount
        );

        let btc = match self
            .execute_leg(self.deps.btc_executor.as_ref(), &btc_address, btc_excess)
            .await
        {
            Ok(result) => result,
            Err((result, e)) => {
                return Err(TransferRunError {
                    btc: Some(result),
                    rsk: None,
                    source: e.wrap(UseCaseId::TransferExcessToColdWallet),
                })
            }
        };

        let rsk = match self
            .execute_leg(self.deps.rsk_executor.as_ref(), &rsk_address, rsk_excess)
            .await
        {
            Ok(result) => result,
            Err((result, e)) => {
                if btc.is_success() {
                    error!(
                        "BTC leg already transferred ({}) but RSK leg failed; state not updated",
                        btc.message
                    );
                }
                return Err(TransferRunError {
                    btc: Some(btc),
                    rsk: Some(result),
                    source: e.wrap(UseCaseId::TransferExcessToColdWallet),
                });
            }
        };

        let result = TransferToColdWalletResult { btc, rsk };
        if result.btc.is_success() || result.rsk.is_success() {
            if let Err(e) = self.persist_state(&result, now).await {
                error!("Funds moved but state was not persisted: {}", e);
                return Err(TransferRunError {
                    btc: Some(result.btc),
                    rsk: Some(result.rsk),
                    source: e.wrap(UseCaseId::TransferExcessToColdWallet),
                });
            }
            self.publish_events(&result);
        }

        Ok(result)
    }

    fn cold_wallet_addresses(&self) -> crate::error::Result<(String, String)> {
        let btc = self.deps.cold_wallet.btc_address();
        let rsk = self.deps.cold_wallet.rsk_address();
        if btc.is_empty() || rsk.is_empty() {
            return Err(Error::NoColdWalletConfigured);
        }
        Ok((btc, rsk))
    }

    async fn validated_configuration(
        &self,
    ) -> crate::error::Result<(Thresholds, DateTime<Utc>, DateTime<Utc>)> {
        let general = self.deps.configuration.general_configuration().await;
        let thresholds = Thresholds::from_configuration(&general)?;

        let state = self.deps.configuration.state_configuration().await?;
        let (last_btc, last_rbtc) = match (
            state.last_btc_to_cold_wallet_transfer,
            state.last_rbtc_to_cold_wallet_transfer,
        ) {
            (Some(btc), Some(rbtc)) => (btc, rbtc),
            _ => return Err(Error::NoTransferHistoryConfigured),
        };

        Ok((thresholds, last_btc, last_rbtc))
    }

    async fn execute_leg(
        &self,
        executor: &dyn TransferExecutor,
        address: &str,
        excess: Excess,
    ) -> std::result::Result<NetworkTransferResult, (NetworkTransferResult, Error)> {
        let network = executor.network();
        if excess.is_zero() {
            info!("No {} excess to transfer", network);
            return Ok(NetworkTransferResult::no_excess(network));
        }

        info!(
            "{} excess of {} wei ({}), transferring to cold wallet",
            network,
            excess.amount,
            if excess.time_forced {
                "time forced"
            } else {
                "above threshold"
            }
        );

        match executor.execute(address, &excess.amount).await {
            Ok(LegOutcome::Transferred {
                tx_hash,
                amount,
                fee,
            }) => Ok(NetworkTransferResult::success(
                network,
                tx_hash,
                amount,
                fee,
                excess.time_forced,
            )),
            Ok(LegOutcome::NotEconomical) => {
                info!("{} transfer skipped, not economical", network);
                Ok(NetworkTransferResult::not_economical(
                    network,
                    excess.time_forced,
                ))
            }
            Err(e) => {
                warn!("{} transfer failed: {}", network, e);
                Err((
                    NetworkTransferResult::failed(network, &e, excess.time_forced),
                    e,
                ))
            }
        }
    }

    /// Record the successful legs on a fresh read of the state
    ///
    /// The address hashes belong to the detector, which does not take the
    /// wallet locks and may have rewritten them while the legs ran.
    async fn persist_state(
        &self,
        result: &TransferToColdWalletResult,
        now: DateTime<Utc>,
    ) -> crate::error::Result<()> {
        let mut state = self.deps.configuration.state_configuration().await?;
        if result.btc.is_success() {
            state.last_btc_to_cold_wallet_transfer = Some(now);
        }
        if result.rsk.is_success() {
            state.last_rbtc_to_cold_wallet_transfer = Some(now);
        }

        let signed = sign_configuration(
            self.deps.signer.as_ref(),
            self.deps.hash_function,
            state,
        )?;
        self.deps.repository.upsert_state_configuration(signed).await
    }

    fn publish_events(&self, result: &TransferToColdWalletResult) {
        for leg in [&result.btc, &result.rsk] {
            if let TransferOutcome::Success {
                tx_hash,
                amount,
                fee,
            } = &leg.outcome
            {
                let data = TransferEventData::new(*amount, tx_hash.clone(), *fee);
                self.deps.event_bus.publish(ColdWalletEvent::transferred(
                    leg.network,
                    leg.time_forced,
                    data,
                ));
            }
        }
    }
}

impl std::fmt::Debug for TransferExcessToColdWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferExcessToColdWallet")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
