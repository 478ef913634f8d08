//! Cold wallet destinations

/// Locates the operator-controlled cold wallet on both networks
///
/// An empty string means the address is not configured.
pub trait ColdWallet: Send + Sync {
    fn btc_address(&self) -> String;

    fn rsk_address(&self) -> String;
}

/// Cold wallet addresses fixed at startup (from configuration)
#[derive(Debug, Clone, Default)]
pub struct StaticColdWallet {
    btc_address: String,
    rsk_address: String,
}

impl StaticColdWallet {
    pub fn new(btc_address: impl Into<String>, rsk_address: impl Into<String>) -> Self {
        Self {
            btc_address: btc_address.into(),
            rsk_address: rsk_address.into(),
        }
    }
}

impl ColdWallet for StaticColdWallet {
    fn btc_address(&self) -> String {
        self.btc_address.clone()
    }

    fn rsk_address(&self) -> String {
        self.rsk_address.clone()
    }
}
