// Key-value slot the steering config is persisted in.
//
// The SQLite history database implements this (settings table); MemoryStore
// covers tests and one-shot runs that shouldn't touch disk.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read the raw value stored under `key`, if any.
    async fn load_setting(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    async fn save_setting(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load_setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn save_setting(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
