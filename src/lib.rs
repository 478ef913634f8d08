//! Cold wallet treasury library
//!
//! Keeps hot wallet liquidity on BTC and RSK near its operating target by
//! sweeping the excess to an operator controlled cold wallet, and watches
//! that cold wallet's addresses for unexpected changes.

pub mod alerts;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod liquidity;
pub mod signing;
pub mod store;
pub mod transfer;
pub mod wallet;
pub mod wei;

#[cfg(test)]
pub(crate) mod testkit;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use wei::Wei;
