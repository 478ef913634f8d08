//! Recording test doubles for the collaborator traits

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::alerts::AlertSender;
use crate::error::{Error, Result};
use crate::events::{ColdWalletEvent, EventBus};
use crate::liquidity::{
    LiquidityProviderRepository, PeginLiquidityProvider, PegoutLiquidityProvider, Signed,
    StateConfiguration,
};
use crate::signing::{Ed25519Signer, Signer};
use crate::wallet::{
    BitcoinTransactionResult, BitcoinWallet, FeeEstimation, RootstockRpc, RootstockWallet,
    TransactionConfig, TransactionReceipt,
};
use crate::wei::Wei;

const TEST_SEED: &str = "4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb";

pub fn test_signer() -> Ed25519Signer {
    Ed25519Signer::from_hex(TEST_SEED).unwrap()
}

pub struct FailingSigner;

impl Signer for FailingSigner {
    fn sign_bytes(&self, _digest: &[u8]) -> Result<Vec<u8>> {
        Err(Error::Signing("hsm unavailable".into()))
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    state: RwLock<Option<Signed<StateConfiguration>>>,
    upserts: AtomicUsize,
    upsert_failure: Mutex<Option<String>>,
}

impl MemoryRepository {
    /// Store `state` directly, bypassing signing
    pub async fn set_state(&self, state: StateConfiguration) {
        *self.state.write().await = Some(Signed {
            value: state,
            hash: String::new(),
            signature: String::new(),
        });
    }

    pub async fn stored(&self) -> Option<Signed<StateConfiguration>> {
        self.state.read().await.clone()
    }

    pub fn upsert_calls(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn fail_upsert(&self, reason: &str) {
        *self.upsert_failure.lock().unwrap() = Some(reason.to_string());
    }
}

#[async_trait]
impl LiquidityProviderRepository for MemoryRepository {
    async fn get_state_configuration(&self) -> Result<Option<Signed<StateConfiguration>>> {
        Ok(self.state.read().await.clone())
    }

    async fn upsert_state_configuration(&self, config: Signed<StateConfiguration>) -> Result<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let failure = self.upsert_failure.lock().unwrap().clone();
        if let Some(reason) = failure {
            return Err(Error::Persistence(reason));
        }
        *self.state.write().await = Some(config);
        Ok(())
    }
}

/// Both liquidity providers: `btc` answers peg-out, `rbtc` answers peg-in
pub struct MockLiquidity {
    btc: Wei,
    rbtc: Wei,
    calls: AtomicUsize,
    pegin_failure: Mutex<Option<String>>,
}

impl MockLiquidity {
    pub fn new(btc: Wei, rbtc: Wei) -> Self {
        Self {
            btc,
            rbtc,
            calls: AtomicUsize::new(0),
            pegin_failure: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_pegin(&self, reason: &str) {
        *self.pegin_failure.lock().unwrap() = Some(reason.to_string());
    }
}

#[async_trait]
impl PeginLiquidityProvider for MockLiquidity {
    async fn available_pegin_liquidity(&self) -> Result<Wei> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.pegin_failure.lock().unwrap().clone() {
            return Err(Error::LiquidityFetch(reason));
        }
        Ok(self.rbtc)
    }
}

#[async_trait]
impl PegoutLiquidityProvider for MockLiquidity {
    async fn available_pegout_liquidity(&self) -> Result<Wei> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.btc)
    }
}

pub struct MockBitcoinWallet {
    fee: Mutex<Wei>,
    estimates: AtomicUsize,
    sends: Mutex<Vec<(String, Wei)>>,
    estimation_failure: Mutex<Option<String>>,
    send_failure: Mutex<Option<String>>,
}

impl MockBitcoinWallet {
    pub fn with_fee(fee: Wei) -> Self {
        Self {
            fee: Mutex::new(fee),
            estimates: AtomicUsize::new(0),
            sends: Mutex::new(Vec::new()),
            estimation_failure: Mutex::new(None),
            send_failure: Mutex::new(None),
        }
    }

    pub fn set_fee(&self, fee: Wei) {
        *self.fee.lock().unwrap() = fee;
    }

    pub fn fail_estimation(&self, reason: &str) {
        *self.estimation_failure.lock().unwrap() = Some(reason.to_string());
    }

    pub fn fail_send(&self, reason: &str) {
        *self.send_failure.lock().unwrap() = Some(reason.to_string());
    }

    pub fn estimate_calls(&self) -> usize {
        self.estimates.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> usize {
        self.sends.lock().unwrap().len()
    }

    pub fn last_sent(&self) -> Option<(String, Wei)> {
        self.sends.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl BitcoinWallet for MockBitcoinWallet {
    async fn estimate_tx_fees(&self, _address: &str, _amount: &Wei) -> Result<FeeEstimation> {
        self.estimates.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.estimation_failure.lock().unwrap().clone() {
            return Err(Error::FeeEstimation(reason));
        }
        Ok(FeeEstimation::new(*self.fee.lock().unwrap()))
    }

    async fn send(&self, address: &str, amount: &Wei) -> Result<BitcoinTransactionResult> {
        if let Some(reason) = self.send_failure.lock().unwrap().clone() {
            return Err(Error::TransactionSend(reason));
        }
        let mut sends = self.sends.lock().unwrap();
        sends.push((address.to_string(), *amount));
        Ok(BitcoinTransactionResult {
            hash: format!("btc-tx-{}", sends.len()),
        })
    }
}

pub struct MockRootstockRpc {
    gas_price: Wei,
    calls: AtomicUsize,
}

impl MockRootstockRpc {
    pub fn with_gas_price(gas_price: Wei) -> Self {
        Self {
            gas_price,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RootstockRpc for MockRootstockRpc {
    async fn gas_price(&self) -> Result<Wei> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.gas_price)
    }
}

/// Mines every transfer with a fixed receipt gas usage and price
pub struct MockRootstockWallet {
    receipt_gas_used: u64,
    receipt_gas_price: Wei,
    sends: Mutex<Vec<TransactionConfig>>,
    send_failure: Mutex<Option<String>>,
}

impl MockRootstockWallet {
    pub fn new(receipt_gas_used: u64, receipt_gas_price: Wei) -> Self {
        Self {
            receipt_gas_used,
            receipt_gas_price,
            sends: Mutex::new(Vec::new()),
            send_failure: Mutex::new(None),
        }
    }

    pub fn fail_send(&self, reason: &str) {
        *self.send_failure.lock().unwrap() = Some(reason.to_string());
    }

    pub fn send_calls(&self) -> usize {
        self.sends.lock().unwrap().len()
    }

    pub fn last_config(&self) -> Option<TransactionConfig> {
        self.sends.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl RootstockWallet for MockRootstockWallet {
    async fn send_rbtc(
        &self,
        config: &TransactionConfig,
        _to_address: &str,
    ) -> Result<TransactionReceipt> {
        if let Some(reason) = self.send_failure.lock().unwrap().clone() {
            return Err(Error::TransactionSend(reason));
        }
        let mut sends = self.sends.lock().unwrap();
        sends.push(config.clone());
        Ok(TransactionReceipt {
            transaction_hash: format!("0xrsk-tx-{}", sends.len()),
            gas_used: self.receipt_gas_used,
            gas_price: self.receipt_gas_price,
        })
    }
}

#[derive(Default)]
pub struct RecordingEventBus {
    events: Mutex<Vec<ColdWalletEvent>>,
}

impl RecordingEventBus {
    pub fn events(&self) -> Vec<ColdWalletEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventBus for RecordingEventBus {
    fn publish(&self, event: ColdWalletEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentAlert {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
}

#[derive(Default)]
pub struct RecordingAlertSender {
    sent: Mutex<Vec<SentAlert>>,
    failure: Mutex<Option<String>>,
}

impl RecordingAlertSender {
    pub fn sent(&self) -> Vec<SentAlert> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail(&self, reason: &str) {
        *self.failure.lock().unwrap() = Some(reason.to_string());
    }
}

#[async_trait]
impl AlertSender for RecordingAlertSender {
    async fn send_alert(&self, subject: &str, body: &str, recipients: &[String]) -> Result<()> {
        if let Some(reason) = self.failure.lock().unwrap().clone() {
            return Err(Error::AlertSend(reason));
        }
        self.sent.lock().unwrap().push(SentAlert {
            subject: subject.to_string(),
            body: body.to_string(),
            recipients: recipients.to_vec(),
        });
        Ok(())
    }
}
