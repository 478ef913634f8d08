//! Configuration loading and validation

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

use crate::liquidity::{ExcessTolerance, GeneralConfiguration};
use crate::signing::{keccak256_hash, sha256_hash, Ed25519Signer, HashFunction};
use crate::wei::Wei;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cold_wallet: ColdWalletConfig,
    pub liquidity: LiquidityConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub signer: SignerConfig,
}

/// Cold wallet destinations (empty = not configured)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColdWalletConfig {
    #[serde(default)]
    pub btc_address: String,
    #[serde(default)]
    pub rsk_address: String,
}

/// Liquidity targets
#[derive(Debug, Clone, Deserialize)]
pub struct LiquidityConfig {
    /// Target liquidity across both networks, decimal wei
    #[serde(default)]
    pub max_liquidity: String,

    pub excess_tolerance: ExcessToleranceConfig,
}

/// Flat operator form of the tolerance; `is_fixed` picks the active value
#[derive(Debug, Clone, Deserialize)]
pub struct ExcessToleranceConfig {
    #[serde(default)]
    pub is_fixed: bool,

    /// Decimal wei, used when `is_fixed`
    #[serde(default)]
    pub fixed_value: Option<String>,

    /// Percent units (20 = 20%), used otherwise
    #[serde(default)]
    pub percentage_value: Option<Decimal>,
}

/// Transfer engine tuning
#[derive(Debug, Clone, Deserialize)]
pub struct TransferConfig {
    #[serde(default = "default_btc_fee_multiplier")]
    pub btc_min_transfer_fee_multiplier: u64,

    #[serde(default = "default_rbtc_fee_multiplier")]
    pub rbtc_min_transfer_fee_multiplier: u64,

    /// Sweep down to target once this long has passed since the last sweep
    #[serde(default = "default_force_transfer_after")]
    pub force_transfer_after_seconds: u64,

    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    #[serde(default = "default_run_timeout")]
    pub run_timeout_secs: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            btc_min_transfer_fee_multiplier: default_btc_fee_multiplier(),
            rbtc_min_transfer_fee_multiplier: default_rbtc_fee_multiplier(),
            force_transfer_after_seconds: default_force_transfer_after(),
            check_interval_secs: default_check_interval(),
            run_timeout_secs: default_run_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_alert_recipient")]
    pub recipient: String,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            recipient: default_alert_recipient(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateConfig {
    #[serde(default = "default_state_path")]
    pub path: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

/// Digest used for the state integrity hash
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    #[default]
    Keccak256,
    Sha256,
}

impl HashAlgorithm {
    pub fn function(&self) -> HashFunction {
        match self {
            HashAlgorithm::Keccak256 => keccak256_hash,
            HashAlgorithm::Sha256 => sha256_hash,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignerConfig {
    /// Hex encoded ed25519 seed, usually set through TREASURY__SIGNER__KEY_HEX
    #[serde(default)]
    pub key_hex: String,

    #[serde(default)]
    pub hash: HashAlgorithm,
}

fn default_btc_fee_multiplier() -> u64 {
    5
}

fn default_rbtc_fee_multiplier() -> u64 {
    100
}

fn default_force_transfer_after() -> u64 {
    604_800 // one week
}

fn default_check_interval() -> u64 {
    3600
}

fn default_run_timeout() -> u64 {
    60
}

fn default_alert_recipient() -> String {
    "ops@localhost".to_string()
}

fn default_state_path() -> String {
    "state/state_configuration.json".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Start with defaults
            .set_default("liquidity.max_liquidity", "")?
            .set_default("liquidity.excess_tolerance.is_fixed", false)?
            .set_default("liquidity.excess_tolerance.percentage_value", 20i64)?
            .set_default("transfer.check_interval_secs", default_check_interval() as i64)?
            .set_default("transfer.run_timeout_secs", default_run_timeout() as i64)?
            .set_default("state.path", default_state_path())?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix TREASURY_)
            .add_source(
                config::Environment::with_prefix("TREASURY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let transfer = &self.transfer;
        if transfer.btc_min_transfer_fee_multiplier == 0 {
            anyhow::bail!("btc_min_transfer_fee_multiplier must be positive");
        }
        if transfer.rbtc_min_transfer_fee_multiplier == 0 {
            anyhow::bail!("rbtc_min_transfer_fee_multiplier must be positive");
        }
        if transfer.force_transfer_after_seconds == 0 {
            anyhow::bail!("force_transfer_after_seconds must be positive");
        }
        if transfer.check_interval_secs == 0 || transfer.run_timeout_secs == 0 {
            anyhow::bail!("check_interval_secs and run_timeout_secs must be positive");
        }

        // Empty cold wallet addresses are reported by the engine at run time
        if !self.cold_wallet.rsk_address.is_empty() {
            let re = regex::Regex::new(r"^0x[0-9a-fA-F]{40}$")?;
            if !re.is_match(&self.cold_wallet.rsk_address) {
                anyhow::bail!("Invalid RSK cold wallet address: {}", self.cold_wallet.rsk_address);
            }
        }

        if !self.liquidity.max_liquidity.trim().is_empty() {
            self.liquidity
                .max_liquidity
                .parse::<Wei>()
                .with_context(|| format!("Invalid max_liquidity: {}", self.liquidity.max_liquidity))?;
        }
        self.excess_tolerance()?;

        if self.alerts.recipient.trim().is_empty() {
            anyhow::bail!("alerts.recipient must not be empty");
        }

        if !self.signer.key_hex.is_empty() {
            self.signer()?;
        }

        Ok(())
    }

    fn excess_tolerance(&self) -> Result<ExcessTolerance> {
        let tolerance = &self.liquidity.excess_tolerance;
        let fixed_value = tolerance
            .fixed_value
            .as_deref()
            .map(str::parse::<Wei>)
            .transpose()
            .context("Invalid excess_tolerance.fixed_value")?;

        ExcessTolerance::from_parts(tolerance.is_fixed, fixed_value, tolerance.percentage_value)
            .context("Invalid excess_tolerance")
    }

    /// Operator configuration in the form the engine consumes
    ///
    /// An empty `max_liquidity` maps to `None` and is rejected by the engine.
    pub fn general_configuration(&self) -> Result<GeneralConfiguration> {
        let raw = self.liquidity.max_liquidity.trim();
        let max_liquidity = if raw.is_empty() {
            None
        } else {
            Some(raw.parse::<Wei>().context("Invalid max_liquidity")?)
        };

        Ok(GeneralConfiguration {
            max_liquidity,
            excess_tolerance: self.excess_tolerance()?,
        })
    }

    /// Signer built from `signer.key_hex`
    pub fn signer(&self) -> Result<Ed25519Signer> {
        if self.signer.key_hex.is_empty() {
            anyhow::bail!("signer.key_hex is not set (TREASURY__SIGNER__KEY_HEX)");
        }
        Ed25519Signer::from_hex(&self.signer.key_hex).context("Invalid signer.key_hex")
    }

    pub fn hash_function(&self) -> HashFunction {
        self.signer.hash.function()
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        let tolerance = &self.liquidity.excess_tolerance;
        format!(
            r#"Configuration:
  Cold wallet:
    btc: {}
    rsk: {}
  Liquidity:
    max_liquidity: {} wei
    excess_tolerance: {}
  Transfer:
    btc_min_fee_multiplier: {}
    rbtc_min_fee_multiplier: {}
    force_after: {}s
    check_interval: {}s
    run_timeout: {}s
  Alerts:
    recipient: {}
  State:
    path: {}
  Signer:
    key: {}
    hash: {:?}
"#,
            display_or_unset(&self.cold_wallet.btc_address),
            display_or_unset(&self.cold_wallet.rsk_address),
            display_or_unset(&self.liquidity.max_liquidity),
            if tolerance.is_fixed {
                format!(
                    "fixed {} wei",
                    tolerance.fixed_value.as_deref().unwrap_or("(not set)")
                )
            } else {
                format!(
                    "{}%",
                    tolerance
                        .percentage_value
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "(not set)".to_string())
                )
            },
            self.transfer.btc_min_transfer_fee_multiplier,
            self.transfer.rbtc_min_transfer_fee_multiplier,
            self.transfer.force_transfer_after_seconds,
            self.transfer.check_interval_secs,
            self.transfer.run_timeout_secs,
            self.alerts.recipient,
            self.state.path,
            if self.signer.key_hex.is_empty() {
                "(not set)"
            } else {
                "***"
            },
            self.signer.hash,
        )
    }
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cold_wallet: ColdWalletConfig::default(),
            liquidity: LiquidityConfig {
                max_liquidity: String::new(),
                excess_tolerance: ExcessToleranceConfig {
                    is_fixed: false,
                    fixed_value: None,
                    percentage_value: Some(Decimal::from(20)),
                },
            },
            transfer: TransferConfig::default(),
            alerts: AlertsConfig::default(),
            state: StateConfig::default(),
            signer: SignerConfig::default(),
        }
    }
}
