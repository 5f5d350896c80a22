// SteeringManager: get/set over the persisted steering config.
//
// Reads always go back to the store so a write from another handle is seen
// on the next read (last write wins). Writes merge a partial update, persist
// the whole struct, and publish it on a watch channel for live listeners.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};

use super::config::{SteeringConfig, SteeringUpdate};
use super::store::SettingsStore;
use crate::detectors::traits::DetectorKind;

/// Fixed key the config is stored under.
pub const STORAGE_KEY: &str = "trust_guardian_steering_config";

pub struct SteeringManager {
    store: Arc<dyn SettingsStore>,
    changes: watch::Sender<SteeringConfig>,
}

impl SteeringManager {
    /// Open the manager over a store, seeding listeners with the stored value.
    pub async fn open(store: Arc<dyn SettingsStore>) -> Self {
        let initial = read_config(store.as_ref()).await;
        let (changes, _) = watch::channel(initial);
        Self { store, changes }
    }

    /// Current config: defaults merged under whatever is persisted.
    ///
    /// An unreadable record is logged and replaced by defaults rather than
    /// blocking a scoring operation.
    pub async fn get(&self) -> SteeringConfig {
        read_config(self.store.as_ref()).await
    }

    /// Merge `update` into the current config, persist it, and notify
    /// subscribers. Returns the config that was stored.
    pub async fn set(&self, update: &SteeringUpdate) -> Result<SteeringConfig> {
        let updated = self.get().await.merged(update);
        let json = serde_json::to_string(&updated).context("Failed to encode steering config")?;
        self.store
            .save_setting(STORAGE_KEY, &json)
            .await
            .context("Failed to save steering config")?;

        info!(
            strictness = updated.detection_strictness,
            haunting = updated.visual_haunting,
            "Steering config updated"
        );
        self.changes.send_replace(updated.clone());
        Ok(updated)
    }

    /// Receive every config written through this manager.
    pub fn subscribe(&self) -> watch::Receiver<SteeringConfig> {
        self.changes.subscribe()
    }

    pub async fn strictness_multiplier(&self) -> f64 {
        self.get().await.strictness_multiplier()
    }

    pub async fn haunting_multiplier(&self) -> f64 {
        self.get().await.haunting_multiplier()
    }

    pub async fn is_agent_active(&self, kind: DetectorKind) -> bool {
        self.get().await.is_agent_active(kind)
    }
}

async fn read_config(store: &dyn SettingsStore) -> SteeringConfig {
    let json = match store.load_setting(STORAGE_KEY).await {
        Ok(Some(json)) => json,
        Ok(None) => return SteeringConfig::default(),
        Err(e) => {
            warn!(error = %e, "Failed to load steering config, using defaults");
            return SteeringConfig::default();
        }
    };

    match serde_json::from_str::<serde_json::Value>(&json) {
        Ok(stored @ serde_json::Value::Object(_)) => {
            let (config, rejected) = SteeringConfig::from_stored(&stored);
            if !rejected.is_empty() {
                warn!(fields = ?rejected, "Invalid steering fields, using their defaults");
            }
            config
        }
        Ok(_) => {
            warn!("Stored steering config is not an object, using defaults");
            SteeringConfig::default()
        }
        Err(e) => {
            warn!(error = %e, "Stored steering config is unreadable, using defaults");
            SteeringConfig::default()
        }
    }
}
