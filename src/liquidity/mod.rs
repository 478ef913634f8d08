//! Liquidity provider configuration and state
//!
//! `GeneralConfiguration` is owned by the operator and only read here.
//! `StateConfiguration` is owned by this crate: the transfer engine writes
//! the transfer timestamps, the address-change detector writes the address
//! hashes. It is always persisted inside a [`Signed`] envelope.

pub mod configuration;
pub mod provider;

pub use configuration::{ExcessTolerance, GeneralConfiguration, Signed, StateConfiguration};
pub use provider::{
    ConfigurationProvider, LiquidityProviderRepository, LocalConfigurationProvider,
    PeginLiquidityProvider, PegoutLiquidityProvider,
};
