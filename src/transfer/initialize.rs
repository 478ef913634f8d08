//! State bootstrap
//!
//! Gives the sweep its transfer-history baseline: any missing transfer
//! timestamp is set to now. Address hashes are left for the detector.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{Result, UseCaseId};
use crate::liquidity::{ConfigurationProvider, LiquidityProviderRepository};
use crate::signing::{sign_configuration, HashFunction, Signer};

pub struct InitializeStateConfiguration {
    configuration: Arc<dyn ConfigurationProvider>,
    repository: Arc<dyn LiquidityProviderRepository>,
    signer: Arc<dyn Signer>,
    hash_function: HashFunction,
}

impl InitializeStateConfiguration {
    pub fn new(
        configuration: Arc<dyn ConfigurationProvider>,
        repository: Arc<dyn LiquidityProviderRepository>,
        signer: Arc<dyn Signer>,
        hash_function: HashFunction,
    ) -> Self {
        Self {
            configuration,
            repository,
            signer,
            hash_function,
        }
    }

    /// Returns whether anything had to be initialized
    pub async fn run(&self) -> Result<bool> {
        self.initialize()
            .await
            .map_err(|e| e.wrap(UseCaseId::InitializeStateConfiguration))
    }

    async fn initialize(&self) -> Result<bool> {
        let mut state = self.configuration.state_configuration().await?;
        let now = Utc::now();
        let mut modified = false;

        if state.last_btc_to_cold_wallet_transfer.is_none() {
            info!("Initializing last BTC cold wallet transfer with current time");
            state.last_btc_to_cold_wallet_transfer = Some(now);
            modified = true;
        }
        if state.last_rbtc_to_cold_wallet_transfer.is_none() {
            info!("Initializing last RBTC cold wallet transfer with current time");
            state.last_rbtc_to_cold_wallet_transfer = Some(now);
            modified = true;
        }

        if !modified {
            debug!("State configuration already initialized");
            return Ok(false);
        }

        let signed = sign_configuration(self.signer.as_ref(), self.hash_function, state)?;
        self.repository.upsert_state_configuration(signed).await?;

        info!("State configuration initialized");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::liquidity::{
        ExcessTolerance, GeneralConfiguration, LocalConfigurationProvider, StateConfiguration,
    };
    use crate::signing::keccak256_hash;
    use crate::testkit::{test_signer, MemoryRepository};
    use chrono::{Duration, TimeZone};

    fn use_case(repo: &Arc<MemoryRepository>) -> InitializeStateConfiguration {
        let general = GeneralConfiguration {
            max_liquidity: None,
            excess_tolerance: ExcessTolerance::Percentage(20.into()),
        };
        InitializeStateConfiguration::new(
            Arc::new(LocalConfigurationProvider::new(general, repo.clone())),
            repo.clone(),
            Arc::new(test_signer()),
            keccak256_hash,
        )
    }

    #[tokio::test]
    async fn test_initializes_empty_store() {
        let repo = Arc::new(MemoryRepository::default());
        let before = Utc::now() - Duration::seconds(1);

        assert!(use_case(&repo).run().await.unwrap());

        let stored = repo.stored().await.unwrap();
        stored.verify_hash(keccak256_hash).unwrap();
        assert!(stored.value.last_btc_to_cold_wallet_transfer.unwrap() > before);
        assert_eq!(
            stored.value.last_btc_to_cold_wallet_transfer,
            stored.value.last_rbtc_to_cold_wallet_transfer
        );
        assert_eq!(stored.value.last_known_btc_cold_wallet_address_hash, None);
    }

    #[tokio::test]
    async fn test_fills_only_missing_timestamp() {
        let repo = Arc::new(MemoryRepository::default());
        let old = Utc.timestamp_opt(1_600_000_000, 0).unwrap();
        repo.set_state(StateConfiguration {
            last_btc_to_cold_wallet_transfer: Some(old),
            last_known_rsk_cold_wallet_address_hash: Some("beef".into()),
            ..Default::default()
        })
        .await;

        assert!(use_case(&repo).run().await.unwrap());

        let stored = repo.stored().await.unwrap().value;
        assert_eq!(stored.last_btc_to_cold_wallet_transfer, Some(old));
        assert!(stored.last_rbtc_to_cold_wallet_transfer.unwrap() > old);
        assert_eq!(stored.rsk_address_hash(), "beef");
    }

    #[tokio::test]
    async fn test_noop_when_initialized() {
        let repo = Arc::new(MemoryRepository::default());
        repo.set_state(StateConfiguration {
            last_btc_to_cold_wallet_transfer: Some(Utc::now()),
            last_rbtc_to_cold_wallet_transfer: Some(Utc::now()),
            ..Default::default()
        })
        .await;

        assert!(!use_case(&repo).run().await.unwrap());
        assert_eq!(repo.upsert_calls(), 0);
    }

    #[tokio::test]
    async fn test_persistence_error_is_wrapped() {
        let repo = Arc::new(MemoryRepository::default());
        repo.fail_upsert("read-only filesystem");

        let err = use_case(&repo).run().await.unwrap_err();
        assert!(matches!(err.root(), Error::Persistence(_)));
        assert_eq!(
            err.use_case(),
            Some(UseCaseId::InitializeStateConfiguration)
        );
    }
}
