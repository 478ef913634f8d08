//! Collaborators that supply liquidity figures and configuration

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::wei::Wei;

use super::configuration::{GeneralConfiguration, Signed, StateConfiguration};

/// Liquidity still available for peg-in (RSK side)
#[async_trait]
pub trait PeginLiquidityProvider: Send + Sync {
    async fn available_pegin_liquidity(&self) -> Result<Wei>;
}

/// Liquidity still available for peg-out (BTC side)
#[async_trait]
pub trait PegoutLiquidityProvider: Send + Sync {
    async fn available_pegout_liquidity(&self) -> Result<Wei>;
}

/// Read-only view of the configuration the sweep runs against
#[async_trait]
pub trait ConfigurationProvider: Send + Sync {
    async fn general_configuration(&self) -> GeneralConfiguration;

    /// Current state; an empty record when nothing has been persisted yet
    async fn state_configuration(&self) -> Result<StateConfiguration>;
}

/// Durable storage for the signed state configuration
#[async_trait]
pub trait LiquidityProviderRepository: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet
    async fn get_state_configuration(&self) -> Result<Option<Signed<StateConfiguration>>>;

    async fn upsert_state_configuration(&self, config: Signed<StateConfiguration>) -> Result<()>;
}

/// Configuration provider backed by a fixed general configuration and the
/// state repository
pub struct LocalConfigurationProvider {
    general: GeneralConfiguration,
    repository: Arc<dyn LiquidityProviderRepository>,
}

impl LocalConfigurationProvider {
    pub fn new(
        general: GeneralConfiguration,
        repository: Arc<dyn LiquidityProviderRepository>,
    ) -> Self {
        Self {
            general,
            repository,
        }
    }
}

#[async_trait]
impl ConfigurationProvider for LocalConfigurationProvider {
    async fn general_configuration(&self) -> GeneralConfiguration {
        self.general.clone()
    }

    async fn state_configuration(&self) -> Result<StateConfiguration> {
        Ok(self
            .repository
            .get_state_configuration()
            .await?
            .map(|signed| signed.value)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liquidity::ExcessTolerance;
    use crate::testkit::MemoryRepository;

    fn general() -> GeneralConfiguration {
        GeneralConfiguration {
            max_liquidity: Some(Wei::from_ether(40)),
            excess_tolerance: ExcessTolerance::Percentage(20.into()),
        }
    }

    #[tokio::test]
    async fn test_state_configuration_defaults_when_absent() {
        let repo = Arc::new(MemoryRepository::default());
        let provider = LocalConfigurationProvider::new(general(), repo.clone());

        assert_eq!(
            provider.state_configuration().await.unwrap(),
            StateConfiguration::default()
        );

        let state = StateConfiguration {
            last_known_btc_cold_wallet_address_hash: Some("aa".into()),
            ..Default::default()
        };
        repo.set_state(state.clone()).await;

        assert_eq!(provider.state_configuration().await.unwrap(), state);
        assert_eq!(provider.general_configuration().await, general());
    }
}
