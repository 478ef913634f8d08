//! Operator alerting

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;

pub const ALERT_SUBJECT_COLD_WALLET_CHANGE: &str = "Cold Wallet Address Change";

#[async_trait]
pub trait AlertSender: Send + Sync {
    async fn send_alert(&self, subject: &str, body: &str, recipients: &[String]) -> Result<()>;
}

/// Writes alerts to the log at warn level
#[derive(Debug, Default, Clone)]
pub struct LogAlertSender;

#[async_trait]
impl AlertSender for LogAlertSender {
    async fn send_alert(&self, subject: &str, body: &str, recipients: &[String]) -> Result<()> {
        warn!("ALERT [{}] to {}: {}", subject, recipients.join(","), body);
        Ok(())
    }
}
