//! File-backed state repository
//!
//! The signed state configuration is kept as one pretty printed JSON
//! document. Writes go to a sibling temp file that is renamed over the
//! target, so a crash mid-write leaves the previous document in place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::liquidity::{LiquidityProviderRepository, Signed, StateConfiguration};

pub struct JsonFileStateRepository {
    path: PathBuf,
    /// Serializes writers within this process
    write_lock: Mutex<()>,
}

impl JsonFileStateRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl LiquidityProviderRepository for JsonFileStateRepository {
    async fn get_state_configuration(&self) -> Result<Option<Signed<StateConfiguration>>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No state configuration at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::Persistence(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let signed: Signed<StateConfiguration> = serde_json::from_str(&content).map_err(|e| {
            Error::Persistence(format!("Failed to parse state configuration: {}", e))
        })?;

        Ok(Some(signed))
    }

    async fn upsert_state_configuration(&self, config: Signed<StateConfiguration>) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let json = serde_json::to_string_pretty(&config).map_err(|e| {
            Error::Persistence(format!("Failed to serialize state configuration: {}", e))
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    Error::Persistence(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| Error::Persistence(format!("Failed to write state: {}", e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::Persistence(format!("Failed to replace state: {}", e)))?;

        info!("Saved state configuration to {}", self.path.display());
        Ok(())
    }
}
