//! Durable key-value session store.
//!
//! Holds the bearer token and the teacher/placement identifiers as flat
//! string values (see `internsight_core::session_keys`). The store is
//! injected into the pipeline so tests can swap in the in-memory variant.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::fs;

/// Key-value store abstraction for session state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn multi_set(&self, pairs: &[(&str, &str)]) -> Result<()>;

    /// Remove every listed key. Missing keys are ignored.
    async fn multi_remove(&self, keys: &[&str]) -> Result<()>;
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn multi_set(&self, pairs: &[(&str, &str)]) -> Result<()> {
        (**self).multi_set(pairs).await
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        (**self).multi_remove(keys).await
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn multi_set(&self, pairs: &[(&str, &str)]) -> Result<()> {
        let mut values = self.lock();
        for (key, value) in pairs {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        let mut values = self.lock();
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }
}

/// File-backed store persisting the session map as a single JSON document.
///
/// Every mutation rewrites the file; the map is small (a handful of keys)
/// so this stays cheap.
pub struct JsonFileSessionStore {
    path: PathBuf,
}

impl JsonFileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<HashMap<String, String>> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(HashMap::new());
        }
        let raw = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read session file {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt session file {}", self.path.display()))
    }

    async fn save(&self, values: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create session directory {}", parent.display())
            })?;
        }
        let raw = serde_json::to_string(values)?;
        fs::write(&self.path, raw)
            .await
            .with_context(|| format!("Failed to write session file {}", self.path.display()))
    }
}

#[async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.load().await?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values).await
    }

    async fn multi_set(&self, pairs: &[(&str, &str)]) -> Result<()> {
        let mut values = self.load().await?;
        for (key, value) in pairs {
            values.insert(key.to_string(), value.to_string());
        }
        self.save(&values).await
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        let mut values = self.load().await?;
        for key in keys {
            values.remove(*key);
        }
        self.save(&values).await
    }
}
