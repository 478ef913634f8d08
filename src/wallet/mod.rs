//! Wallet boundary
//!
//! The treasury core never holds keys. It talks to the two hot wallets and
//! the cold wallet locator through the traits defined here:
//!
//! ```text
//! ColdWallet (destinations)   BitcoinWallet (fees, send)   RootstockWallet + RootstockRpc
//!            \                         |                           /
//!             +------------- transfer executors -------------------+
//! ```
//!
//! Each hot wallet is guarded by a caller-owned [`WalletMutex`] so the
//! sweep never races with payouts happening elsewhere in the service.

pub mod cold;
pub mod transfer;
pub mod types;

pub use cold::{ColdWallet, StaticColdWallet};
pub use transfer::{BitcoinWallet, RootstockRpc, RootstockWallet, WalletMutex};
pub use types::{
    BitcoinTransactionResult, FeeEstimation, Network, TransactionConfig, TransactionReceipt,
    SIMPLE_TRANSFER_GAS_LIMIT,
};
