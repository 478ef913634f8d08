//! Cold wallet use cases
//!
//! - [`TransferExcessToColdWallet`]: sweep excess hot wallet liquidity
//! - [`CheckColdWalletAddressChange`]: alert on cold wallet address drift
//! - [`InitializeStateConfiguration`]: create the transfer-history baseline
//! - [`TransferColdWalletWatcher`]: run the sweep periodically

pub mod address_change;
pub mod excess;
pub mod executor;
pub mod initialize;
pub mod orchestrator;
pub mod result;
pub mod watcher;

pub use address_change::{AddressCheck, CheckColdWalletAddressChange};
pub use excess::{excess_with_time_forcing, Excess, Thresholds};
pub use executor::{BtcTransferExecutor, LegOutcome, RskTransferExecutor, TransferExecutor};
pub use initialize::InitializeStateConfiguration;
pub use orchestrator::{TransferCollaborators, TransferExcessToColdWallet, TransferSettings};
pub use result::{
    NetworkTransferResult, TransferOutcome, TransferRunError, TransferToColdWalletResult,
};
pub use watcher::{ColdWalletSweep, TransferColdWalletWatcher, WatcherSettings};
