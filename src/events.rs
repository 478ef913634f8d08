//! Transfer events
//!
//! One event is published per successful leg, identified by network and
//! by what triggered the sweep (excess above threshold, or time forcing).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::wallet::Network;
use crate::wei::Wei;

/// Payload shared by every transfer event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEventData {
    pub id: Uuid,
    pub amount: Wei,
    pub tx_hash: String,
    pub fee: Wei,
    pub timestamp: DateTime<Utc>,
}

impl TransferEventData {
    pub fn new(amount: Wei, tx_hash: impl Into<String>, fee: Wei) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            tx_hash: tx_hash.into(),
            fee,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ColdWalletEvent {
    BtcTransferredDueToThreshold(TransferEventData),
    BtcTransferredDueToTimeForcing(TransferEventData),
    RbtcTransferredDueToThreshold(TransferEventData),
    RbtcTransferredDueToTimeForcing(TransferEventData),
}

impl ColdWalletEvent {
    /// Event for a successful leg
    pub fn transferred(network: Network, time_forced: bool, data: TransferEventData) -> Self {
        match (network, time_forced) {
            (Network::Btc, false) => ColdWalletEvent::BtcTransferredDueToThreshold(data),
            (Network::Btc, true) => ColdWalletEvent::BtcTransferredDueToTimeForcing(data),
            (Network::Rsk, false) => ColdWalletEvent::RbtcTransferredDueToThreshold(data),
            (Network::Rsk, true) => ColdWalletEvent::RbtcTransferredDueToTimeForcing(data),
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            ColdWalletEvent::BtcTransferredDueToThreshold(_) => "BtcTransferredDueToThreshold",
            ColdWalletEvent::BtcTransferredDueToTimeForcing(_) => "BtcTransferredDueToTimeForcing",
            ColdWalletEvent::RbtcTransferredDueToThreshold(_) => "RbtcTransferredDueToThreshold",
            ColdWalletEvent::RbtcTransferredDueToTimeForcing(_) => {
                "RbtcTransferredDueToTimeForcing"
            }
        }
    }

    pub fn network(&self) -> Network {
        match self {
            ColdWalletEvent::BtcTransferredDueToThreshold(_)
            | ColdWalletEvent::BtcTransferredDueToTimeForcing(_) => Network::Btc,
            _ => Network::Rsk,
        }
    }

    pub fn is_time_forced(&self) -> bool {
        matches!(
            self,
            ColdWalletEvent::BtcTransferredDueToTimeForcing(_)
                | ColdWalletEvent::RbtcTransferredDueToTimeForcing(_)
        )
    }

    pub fn data(&self) -> &TransferEventData {
        match self {
            ColdWalletEvent::BtcTransferredDueToThreshold(data)
            | ColdWalletEvent::BtcTransferredDueToTimeForcing(data)
            | ColdWalletEvent::RbtcTransferredDueToThreshold(data)
            | ColdWalletEvent::RbtcTransferredDueToTimeForcing(data) => data,
        }
    }
}

/// Fire-and-forget publication
pub trait EventBus: Send + Sync {
    fn publish(&self, event: ColdWalletEvent);
}

/// In-process bus over a tokio broadcast channel
pub struct BroadcastEventBus {
    sender: broadcast::Sender<ColdWalletEvent>,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ColdWalletEvent> {
        self.sender.subscribe()
    }
}

impl EventBus for BroadcastEventBus {
    fn publish(&self, event: ColdWalletEvent) {
        debug!("Publishing {} (tx {})", event.id(), event.data().tx_hash);
        // No subscriber is not an error
        let _ = self.sender.send(event);
    }
}

/// Running count and volume for one event id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TallyEntry {
    pub count: u64,
    pub total_amount: Wei,
}

/// Counts transfer events per event id
#[derive(Clone, Default)]
pub struct TransferTally {
    entries: Arc<RwLock<HashMap<&'static str, TallyEntry>>>,
}

impl TransferTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, event: &ColdWalletEvent) {
        let mut entries = self.entries.write().await;
        let entry = entries.entry(event.id()).or_default();
        entry.count += 1;
        entry.total_amount = match entry.total_amount.checked_add(&event.data().amount) {
            Ok(total) => total,
            Err(e) => {
                warn!("Tally for {} saturated: {}", event.id(), e);
                entry.total_amount
            }
        };
    }

    pub async fn get(&self, event_id: &str) -> TallyEntry {
        self.entries
            .read()
            .await
            .get(event_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn snapshot(&self) -> HashMap<&'static str, TallyEntry> {
        self.entries.read().await.clone()
    }

    /// Consume events until the bus closes or shutdown fires
    pub fn spawn(
        &self,
        mut events: broadcast::Receiver<ColdWalletEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> tokio::task::JoinHandle<()> {
        let tally = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    received = events.recv() => match received {
                        Ok(event) => {
                            info!(
                                "{} on {}: {} wei (tx {})",
                                event.id(),
                                event.network(),
                                event.data().amount,
                                event.data().tx_hash
                            );
                            tally.record(&event).await;
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("Transfer tally lagged, {} events dropped", skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = shutdown.recv() => {
                        debug!("Transfer tally shutting down");
                        break;
                    }
                }
            }
        })
    }
}
