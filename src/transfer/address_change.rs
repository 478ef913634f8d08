//! Cold wallet address drift detection
//!
//! Compares a digest of each configured cold wallet address with the one
//! recorded in the state configuration. The first run records the digests
//! silently; later differences alert the operator before the new digests
//! are stored.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::alerts::{AlertSender, ALERT_SUBJECT_COLD_WALLET_CHANGE};
use crate::error::{Error, Result, UseCaseId};
use crate::liquidity::{LiquidityProviderRepository, StateConfiguration};
use crate::signing::{address_hash, sign_configuration, HashFunction, Signer};
use crate::wallet::{ColdWallet, Network};

/// What a detector run decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressCheck {
    /// No digests were stored yet; current ones recorded
    FirstRun,
    Unchanged,
    /// Alerts sent for these networks and current digests recorded
    Changed(Vec<Network>),
}

pub struct CheckColdWalletAddressChange {
    repository: Arc<dyn LiquidityProviderRepository>,
    cold_wallet: Arc<dyn ColdWallet>,
    alert_sender: Arc<dyn AlertSender>,
    alert_recipient: String,
    signer: Arc<dyn Signer>,
    hash_function: HashFunction,
}

impl CheckColdWalletAddressChange {
    pub fn new(
        repository: Arc<dyn LiquidityProviderRepository>,
        cold_wallet: Arc<dyn ColdWallet>,
        alert_sender: Arc<dyn AlertSender>,
        alert_recipient: impl Into<String>,
        signer: Arc<dyn Signer>,
        hash_function: HashFunction,
    ) -> Self {
        Self {
            repository,
            cold_wallet,
            alert_sender,
            alert_recipient: alert_recipient.into(),
            signer,
            hash_function,
        }
    }

    pub async fn run(&self) -> Result<AddressCheck> {
        self.check()
            .await
            .map_err(|e| e.wrap(UseCaseId::CheckColdWalletAddressChange))
    }

    async fn check(&self) -> Result<AddressCheck> {
        let mut state = self
            .repository
            .get_state_configuration()
            .await?
            .ok_or(Error::StateNotInitialized)?
            .value;

        let btc_address = self.cold_wallet.btc_address();
        if btc_address.is_empty() {
            return Err(Error::ColdWalletAddressMissing(Network::Btc));
        }
        let rsk_address = self.cold_wallet.rsk_address();
        if rsk_address.is_empty() {
            return Err(Error::ColdWalletAddressMissing(Network::Rsk));
        }

        let btc_hash = address_hash(&btc_address);
        let rsk_hash = address_hash(&rsk_address);

        let stored_btc = state.btc_address_hash();
        let stored_rsk = state.rsk_address_hash();

        let outcome = if stored_btc.is_empty() && stored_rsk.is_empty() {
            info!("First cold wallet address check, recording address hashes");
            AddressCheck::FirstRun
        } else {
            let changed: Vec<Network> = [
                (Network::Btc, stored_btc, btc_hash.as_str()),
                (Network::Rsk, stored_rsk, rsk_hash.as_str()),
            ]
            .into_iter()
            .filter(|(_, stored, current)| !stored.is_empty() && stored != current)
            .map(|(network, _, _)| network)
            .collect();

            if changed.is_empty() {
                return Ok(AddressCheck::Unchanged);
            }

            for network in &changed {
                self.alert(*network).await?;
            }
            AddressCheck::Changed(changed)
        };

        state.last_known_btc_cold_wallet_address_hash = Some(btc_hash);
        state.last_known_rsk_cold_wallet_address_hash = Some(rsk_hash);
        self.persist(state).await?;

        Ok(outcome)
    }

    async fn alert(&self, network: Network) -> Result<()> {
        let body = format!(
            "Cold wallet address change detected at startup | Network: {}",
            network
        );
        warn!("{}", body);

        self.alert_sender
            .send_alert(
                ALERT_SUBJECT_COLD_WALLET_CHANGE,
                &body,
                std::slice::from_ref(&self.alert_recipient),
            )
            .await
            .map_err(|e| {
                error!("Failed to send {} cold wallet change alert: {}", network, e);
                Error::AlertSend(format!("{} cold wallet change alert: {}", network, e))
            })
    }

    async fn persist(&self, state: StateConfiguration) -> Result<()> {
        let signed = sign_configuration(self.signer.as_ref(), self.hash_function, state)?;
        self.repository.upsert_state_configuration(signed).await
    }
}
