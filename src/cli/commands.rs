//! CLI command implementations

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::alerts::LogAlertSender;
use crate::config::Config;
use crate::liquidity::{LiquidityProviderRepository, LocalConfigurationProvider};
use crate::store::JsonFileStateRepository;
use crate::transfer::{AddressCheck, CheckColdWalletAddressChange, InitializeStateConfiguration, Thresholds};
use crate::wallet::StaticColdWallet;

fn repository(config: &Config) -> Arc<JsonFileStateRepository> {
    Arc::new(JsonFileStateRepository::new(&config.state.path))
}

/// Create the transfer-history baseline if it is missing
pub async fn init_state(config: &Config) -> Result<()> {
    let repo = repository(config);
    let provider = Arc::new(LocalConfigurationProvider::new(
        config.general_configuration()?,
        repo.clone(),
    ));

    let use_case = InitializeStateConfiguration::new(
        provider,
        repo,
        Arc::new(config.signer()?),
        config.hash_function(),
    );

    if use_case.run().await? {
        println!("State configuration initialized at {}", config.state.path);
    } else {
        println!("State configuration already initialized");
    }
    Ok(())
}

/// Compare configured cold wallet addresses with the recorded ones
pub async fn check_cold_wallet(config: &Config) -> Result<()> {
    let use_case = CheckColdWalletAddressChange::new(
        repository(config),
        Arc::new(StaticColdWallet::new(
            &config.cold_wallet.btc_address,
            &config.cold_wallet.rsk_address,
        )),
        Arc::new(LogAlertSender),
        &config.alerts.recipient,
        Arc::new(config.signer()?),
        config.hash_function(),
    );

    match use_case.run().await? {
        AddressCheck::FirstRun => println!("Cold wallet address hashes recorded (first run)"),
        AddressCheck::Unchanged => println!("Cold wallet addresses unchanged"),
        AddressCheck::Changed(networks) => {
            let names: Vec<_> = networks.iter().map(|n| n.as_str()).collect();
            println!(
                "Cold wallet address CHANGED on {} - alert sent to {}",
                names.join(", "),
                config.alerts.recipient
            );
        }
    }
    Ok(())
}

/// Print the stored state configuration and check its integrity hash
pub async fn show_state(config: &Config) -> Result<()> {
    let repo = repository(config);
    let Some(signed) = repo.get_state_configuration().await? else {
        println!("No state configuration at {} (run init-state)", config.state.path);
        return Ok(());
    };

    let state = &signed.value;
    let fmt_time = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "(never)".to_string())
    };
    let fmt_hash = |h: &str| {
        if h.is_empty() {
            "(not recorded)".to_string()
        } else {
            h.to_string()
        }
    };

    println!("\n=== STATE CONFIGURATION ===\n");
    println!(
        "{:<28} {}",
        "Last BTC transfer:",
        fmt_time(state.last_btc_to_cold_wallet_transfer)
    );
    println!(
        "{:<28} {}",
        "Last RBTC transfer:",
        fmt_time(state.last_rbtc_to_cold_wallet_transfer)
    );
    println!("{:<28} {}", "BTC cold address hash:", fmt_hash(state.btc_address_hash()));
    println!("{:<28} {}", "RSK cold address hash:", fmt_hash(state.rsk_address_hash()));
    println!("{:<28} {}", "Hash:", signed.hash);
    println!("{:<28} {}", "Signature:", signed.signature);

    signed
        .verify_hash(config.hash_function())
        .context("State configuration integrity check failed")?;
    println!("\nIntegrity hash OK");
    Ok(())
}

/// Print the per-network target and sweep threshold
pub fn thresholds(config: &Config) -> Result<()> {
    let general = config.general_configuration()?;
    let thresholds = Thresholds::from_configuration(&general)?;

    info!("Computed thresholds from {}", config.liquidity.max_liquidity);
    println!("\n=== LIQUIDITY THRESHOLDS (per network) ===\n");
    println!("{:<20} {} wei", "Max liquidity:", config.liquidity.max_liquidity);
    println!("{:<20} {}", "Tolerance:", general.excess_tolerance);
    println!("{:<20} {} wei", "Target:", thresholds.target);
    println!("{:<20} {} wei", "Sweep threshold:", thresholds.threshold);
    println!(
        "{:<20} {}s",
        "Time forcing after:", config.transfer.force_transfer_after_seconds
    );
    println!();
    Ok(())
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";

    fn config_in(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.state.path = dir
            .path()
            .join("state.json")
            .to_string_lossy()
            .into_owned();
        config.signer.key_hex = SEED.to_string();
        config.cold_wallet.btc_address = "bc1qcoldwallet".to_string();
        config.cold_wallet.rsk_address = "0x79568c2989232dCa1840087D73d403602364c0D4".to_string();
        config
    }

    #[tokio::test]
    async fn test_init_state_then_check_cold_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);

        init_state(&config).await.unwrap();
        check_cold_wallet(&config).await.unwrap();
        show_state(&config).await.unwrap();

        let signed = repository(&config)
            .get_state_configuration()
            .await
            .unwrap()
            .unwrap();
        assert!(signed.value.last_btc_to_cold_wallet_transfer.is_some());
        assert!(!signed.value.btc_address_hash().is_empty());
        signed.verify_hash(config.hash_function()).unwrap();
    }

    #[tokio::test]
    async fn test_check_cold_wallet_requires_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);

        assert!(check_cold_wallet(&config).await.is_err());
    }

    #[test]
    fn test_thresholds_need_max_liquidity() {
        let mut config = Config::default();
        assert!(thresholds(&config).is_err());

        config.liquidity.max_liquidity = "40000000000000000000".to_string();
        thresholds(&config).unwrap();
    }
}
