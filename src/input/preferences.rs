//! Key/value persistence for the last chosen language.

use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};

use async_trait::async_trait;
use parking_lot::Mutex;

/// Persistent string store. Keys are scoped as `"<instanceName>.<suffix>"`.
///
/// Implementations absorb their own I/O failures; a failed write is logged and
/// a failed read behaves like an absent key.
#[async_trait]
pub trait PreferenceStore: Send + Sync + std::fmt::Debug {
    /// Stored value, `None` when absent or unreadable.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str);
}

/// Process-lifetime store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Stored pairs.
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }
}

/// Store persisted as one flat JSON object file.
#[derive(Debug)]
pub struct JsonFileStore {
    /// Backing file, rewritten on every `set`.
    path: PathBuf,
    /// In-memory copy of the file; held across the write.
    values: tokio::sync::Mutex<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing or malformed file starts empty.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = Self::load(&path).await;
        Self { path, values: tokio::sync::Mutex::new(values) }
    }

    /// Reads the file, treating every failure as an empty store.
    async fn load(path: &Path) -> HashMap<String, String> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                tracing::warn!("Failed to read preferences {:?}: {}", path, e);
                return HashMap::new();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed preferences {:?}: {}", path, e);
            HashMap::new()
        })
    }
}

#[async_trait]
impl PreferenceStore for JsonFileStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.lock().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        let mut values = self.values.lock().await;
        values.insert(key.to_string(), value.to_string());

        let content = match serde_json::to_string_pretty(&*values) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to encode preferences: {}", e);
                return;
            }
        };
        if let Some(parent) = self.path.parent()
            && let Err(e) = tokio::fs::create_dir_all(parent).await
        {
            tracing::warn!("Failed to create preferences directory {:?}: {}", parent, e);
            return;
        }
        if let Err(e) = tokio::fs::write(&self.path, content).await {
            tracing::warn!("Failed to write preferences {:?}: {}", self.path, e);
        }
    }
}
