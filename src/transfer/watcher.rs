//! Periodic sweep
//!
//! Runs the transfer engine on a fixed interval, each run bounded by a
//! timeout. A failed or timed out run is logged and the loop waits for the
//! next tick; nothing is retried in between.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info, warn};

use crate::config::TransferConfig;
use crate::error::{Error, UseCaseId};

use super::orchestrator::TransferExcessToColdWallet;
use super::result::{
    NetworkTransferResult, TransferOutcome, TransferRunError, TransferToColdWalletResult,
};

/// Anything that can perform one sweep
#[async_trait]
pub trait ColdWalletSweep: Send + Sync {
    async fn sweep(&self) -> Result<TransferToColdWalletResult, TransferRunError>;
}

#[async_trait]
impl ColdWalletSweep for TransferExcessToColdWallet {
    async fn sweep(&self) -> Result<TransferToColdWalletResult, TransferRunError> {
        self.run().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherSettings {
    pub check_interval: Duration,
    pub run_timeout: Duration,
}

impl From<&TransferConfig> for WatcherSettings {
    fn from(config: &TransferConfig) -> Self {
        Self {
            check_interval: Duration::from_secs(config.check_interval_secs),
            run_timeout: Duration::from_secs(config.run_timeout_secs),
        }
    }
}

pub struct TransferColdWalletWatcher {
    sweep: Arc<dyn ColdWalletSweep>,
    settings: WatcherSettings,
    shutdown: broadcast::Sender<()>,
}

impl TransferColdWalletWatcher {
    pub fn new(sweep: Arc<dyn ColdWalletSweep>, settings: WatcherSettings) -> Self {
        let (shutdown, _) = broadcast::channel(1);
        Self {
            sweep,
            settings,
            shutdown,
        }
    }

    /// One sweep under the run timeout
    pub async fn run_once(&self) -> Result<TransferToColdWalletResult, TransferRunError> {
        run_with_timeout(self.sweep.as_ref(), self.settings.run_timeout).await
    }

    /// Start the watcher loop; the first sweep happens one interval from now
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        let sweep = self.sweep.clone();
        let settings = self.settings;
        let mut shutdown_rx = self.shutdown.subscribe();

        info!(
            "Starting cold wallet transfer watcher (every {:?}, timeout {:?})",
            settings.check_interval, settings.run_timeout
        );

        tokio::spawn(async move {
            let mut ticker = interval_at(
                Instant::now() + settings.check_interval,
                settings.check_interval,
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match run_with_timeout(sweep.as_ref(), settings.run_timeout).await {
                            Ok(result) => log_result(&result),
                            Err(e) => {
                                error!("Cold wallet transfer run failed: {}", e);
                                for leg in [&e.btc, &e.rsk].into_iter().flatten() {
                                    log_leg(leg);
                                }
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Cold wallet transfer watcher shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// Stop the watcher loop
    pub fn stop(&self) {
        let _ = self.shutdown.send(());
    }
}

async fn run_with_timeout(
    sweep: &dyn ColdWalletSweep,
    timeout: Duration,
) -> Result<TransferToColdWalletResult, TransferRunError> {
    match tokio::time::timeout(timeout, sweep.sweep()).await {
        Ok(result) => result,
        Err(_) => Err(TransferRunError::before_transfer(
            Error::Timeout(timeout.as_secs()).wrap(UseCaseId::TransferExcessToColdWallet),
        )),
    }
}

fn log_result(result: &TransferToColdWalletResult) {
    log_leg(&result.btc);
    log_leg(&result.rsk);
}

fn log_leg(leg: &NetworkTransferResult) {
    match &leg.outcome {
        TransferOutcome::Success {
            tx_hash,
            amount,
            fee,
        } => info!(
            "{} transfer successful - tx {}, amount {}, fee {}{}",
            leg.network,
            tx_hash,
            amount,
            fee,
            if leg.time_forced { " (time forced)" } else { "" }
        ),
        TransferOutcome::SkippedNoExcess => {
            debug!("{} transfer skipped - no excess liquidity", leg.network)
        }
        TransferOutcome::SkippedNotEconomical => {
            info!("{} transfer skipped - {}", leg.network, leg.message)
        }
        TransferOutcome::Failed { error } => {
            warn!("{} - {}", leg.message, error)
        }
    }
}
