//! Error types for the treasury core

use thiserror::Error;

use crate::wallet::Network;
use crate::wei::WeiError;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Identifier attached to every error leaving a use case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseCaseId {
    TransferExcessToColdWallet,
    CheckColdWalletAddressChange,
    InitializeStateConfiguration,
}

impl UseCaseId {
    pub fn as_str(&self) -> &'static str {
        match self {
            UseCaseId::TransferExcessToColdWallet => "TransferExcessToColdWallet",
            UseCaseId::CheckColdWalletAddressChange => "CheckColdWalletAddressChange",
            UseCaseId::InitializeStateConfiguration => "InitializeStateConfiguration",
        }
    }
}

impl std::fmt::Display for UseCaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the treasury core
#[derive(Error, Debug)]
pub enum Error {
    // Precondition errors
    #[error("cold wallet not configured")]
    NoColdWalletConfigured,

    #[error("cold wallet {0} address not configured")]
    ColdWalletAddressMissing(Network),

    #[error("max liquidity not configured")]
    NoMaxLiquidityConfigured,

    #[error("invalid excess tolerance: {0}")]
    InvalidExcessTolerance(String),

    #[error("no transfer history configured - state configuration must be initialized")]
    NoTransferHistoryConfigured,

    #[error("state configuration not initialized (initialize-state must run first)")]
    StateNotInitialized,

    // Amount arithmetic
    #[error("Amount arithmetic error: {0}")]
    Arithmetic(#[from] WeiError),

    // RPC / wallet errors
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Liquidity fetch failed: {0}")]
    LiquidityFetch(String),

    #[error("Fee estimation failed: {0}")]
    FeeEstimation(String),

    #[error("Transaction send failed: {0}")]
    TransactionSend(String),

    // Signing errors
    #[error("Signing failed: {0}")]
    Signing(String),

    // Persistence errors
    #[error("State persistence failed: {0}")]
    Persistence(String),

    #[error("State integrity check failed: {0}")]
    Integrity(String),

    // Alerting errors
    #[error("Alert send failed: {0}")]
    AlertSend(String),

    // Scheduling
    #[error("Run timed out after {0}s")]
    Timeout(u64),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error tagged with the use case it escaped from
    #[error("{id}: {source}")]
    UseCase {
        id: UseCaseId,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Tag this error with a use case identifier
    pub fn wrap(self, id: UseCaseId) -> Self {
        Error::UseCase {
            id,
            source: Box::new(self),
        }
    }

    /// Innermost error, with every use case tag removed
    pub fn root(&self) -> &Error {
        match self {
            Error::UseCase { source, .. } => source.root(),
            other => other,
        }
    }

    /// Use case tag on the outermost wrapper, if any
    pub fn use_case(&self) -> Option<UseCaseId> {
        match self {
            Error::UseCase { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Check if this error is retryable (transient)
    ///
    /// Nothing in this crate retries; the scheduler decides what to do with it.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.root(),
            Error::Rpc(_)
                | Error::LiquidityFetch(_)
                | Error::FeeEstimation(_)
                | Error::TransactionSend(_)
                | Error::Timeout(_)
        )
    }

    /// Check if this error is a configuration precondition failure
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.root(),
            Error::NoColdWalletConfigured
                | Error::ColdWalletAddressMissing(_)
                | Error::NoMaxLiquidityConfigured
                | Error::InvalidExcessTolerance(_)
                | Error::NoTransferHistoryConfigured
                | Error::StateNotInitialized
        )
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
