//! Persisted per-node settings: serialized scene plus canvas size.
//!
//! The storage medium (local files, remote JSON, in-memory) is an external
//! configuration choice; the core only sees the [`SettingsStore`] contract.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use thiserror::Error;

use crate::scene::SceneSnapshot;

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

/// Longest edge a node canvas may take.
pub const MAX_CANVAS_EDGE: u32 = 1024;

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scale down so the longer edge fits [`MAX_CANVAS_EDGE`].
    pub fn clamped(self) -> Self {
        let long = self.width.max(self.height);
        if long <= MAX_CANVAS_EDGE {
            return self;
        }
        let scale = MAX_CANVAS_EDGE as f64 / long as f64;
        Self {
            width: (self.width as f64 * scale).round() as u32,
            height: (self.height as f64 * scale).round() as u32,
        }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
        }
    }
}

/// Value persisted for one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSettings {
    pub scene: SceneSnapshot,
    pub canvas_size: CanvasSize,
}

/// Settings store errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Settings error: {0}")]
    Other(String),
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for settings storage backends, keyed by node identifier.
pub trait SettingsStore: Send + Sync {
    fn save(&self, key: &str, settings: &PersistedSettings) -> BoxFuture<'_, SettingsResult<()>>;

    fn load(&self, key: &str) -> BoxFuture<'_, SettingsResult<PersistedSettings>>;

    fn delete(&self, key: &str) -> BoxFuture<'_, SettingsResult<()>>;

    fn exists(&self, key: &str) -> BoxFuture<'_, SettingsResult<bool>>;
}

/// In-memory settings store for testing and ephemeral use.
#[derive(Default)]
pub struct MemorySettings {
    entries: RwLock<HashMap<String, PersistedSettings>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn save(&self, key: &str, settings: &PersistedSettings) -> BoxFuture<'_, SettingsResult<()>> {
        let key = key.to_string();
        let settings = settings.clone();
        Box::pin(async move {
            let mut entries = self
                .entries
                .write()
                .map_err(|e| SettingsError::Other(format!("Lock error: {e}")))?;
            entries.insert(key, settings);
            Ok(())
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, SettingsResult<PersistedSettings>> {
        let key = key.to_string();
        Box::pin(async move {
            let entries = self
                .entries
                .read()
                .map_err(|e| SettingsError::Other(format!("Lock error: {e}")))?;
            entries
                .get(&key)
                .cloned()
                .ok_or(SettingsError::NotFound(key))
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, SettingsResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut entries = self
                .entries
                .write()
                .map_err(|e| SettingsError::Other(format!("Lock error: {e}")))?;
            entries.remove(&key);
            Ok(())
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, SettingsResult<bool>> {
        let key = key.to_string();
        Box::pin(async move {
            let entries = self
                .entries
                .read()
                .map_err(|e| SettingsError::Other(format!("Lock error: {e}")))?;
            Ok(entries.contains_key(&key))
        })
    }
}

/// File-based settings store for native platforms; one JSON file per node.
#[cfg(not(target_arch = "wasm32"))]
pub struct FileSettings {
    base_path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileSettings {
    /// Create a file store rooted at `base_path`, creating the directory if
    /// needed.
    pub fn new(base_path: std::path::PathBuf) -> SettingsResult<Self> {
        if !base_path.exists() {
            std::fs::create_dir_all(&base_path).map_err(|e| {
                SettingsError::Io(format!("Failed to create settings directory: {e}"))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create the store in the platform default location.
    pub fn default_location() -> SettingsResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| SettingsError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("nodepaint").join("settings"))
    }

    fn settings_path(&self, key: &str) -> std::path::PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{safe}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SettingsStore for FileSettings {
    fn save(&self, key: &str, settings: &PersistedSettings) -> BoxFuture<'_, SettingsResult<()>> {
        let path = self.settings_path(key);
        let json = match serde_json::to_string(settings) {
            Ok(json) => json,
            Err(e) => {
                return Box::pin(async move { Err(SettingsError::Serialization(e.to_string())) })
            }
        };
        Box::pin(async move {
            std::fs::write(&path, json)
                .map_err(|e| SettingsError::Io(format!("Failed to write {}: {e}", path.display())))
        })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, SettingsResult<PersistedSettings>> {
        let path = self.settings_path(key);
        let key = key.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(SettingsError::NotFound(key));
            }
            let json = std::fs::read_to_string(&path)
                .map_err(|e| SettingsError::Io(format!("Failed to read {}: {e}", path.display())))?;
            serde_json::from_str(&json).map_err(|e| {
                SettingsError::Serialization(format!("Failed to parse {}: {e}", path.display()))
            })
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, SettingsResult<()>> {
        let path = self.settings_path(key);
        Box::pin(async move {
            if path.exists() {
                std::fs::remove_file(&path).map_err(|e| {
                    SettingsError::Io(format!("Failed to delete {}: {e}", path.display()))
                })?;
            }
            Ok(())
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, SettingsResult<bool>> {
        let path = self.settings_path(key);
        Box::pin(async move { Ok(path.exists()) })
    }
}

/// Keyed settings registry with an explicit lifecycle: opened with the
/// editing surface, written through on commit, closed on disposal.
pub struct SettingsRegistry<S: SettingsStore> {
    store: Arc<S>,
    cache: HashMap<String, PersistedSettings>,
}

impl<S: SettingsStore + 'static> SettingsRegistry<S> {
    /// Open the registry over a storage backend.
    pub fn open(store: Arc<S>) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PersistedSettings> {
        self.cache.get(key)
    }

    /// Stage a value for `key`; written out by the next flush.
    pub fn insert(&mut self, key: impl Into<String>, settings: PersistedSettings) {
        self.cache.insert(key.into(), settings);
    }

    /// Read a value through the backing store, caching it.
    pub fn load(&mut self, key: &str) -> BoxFuture<'_, SettingsResult<PersistedSettings>> {
        let store = Arc::clone(&self.store);
        let key = key.to_string();
        Box::pin(async move {
            let settings = store.load(&key).await?;
            self.cache.insert(key, settings.clone());
            Ok(settings)
        })
    }

    /// Write the staged value for `key` to the backing store.
    pub fn flush(&self, key: &str) -> BoxFuture<'static, SettingsResult<()>> {
        let store = Arc::clone(&self.store);
        let key = key.to_string();
        let value = self.cache.get(&key).cloned();
        Box::pin(async move {
            match value {
                Some(settings) => store.save(&key, &settings).await,
                None => Ok(()),
            }
        })
    }

    /// Flush every staged value and drop the cache.
    pub fn close(mut self) -> BoxFuture<'static, SettingsResult<()>> {
        let store = Arc::clone(&self.store);
        let entries: Vec<_> = self.cache.drain().collect();
        Box::pin(async move {
            for (key, settings) in entries {
                store.save(&key, &settings).await?;
            }
            Ok(())
        })
    }
}
