//! Key-value preferences used to restore UI state between sessions.

use super::{BoxFuture, StorageBounds, StorageError, StorageResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::RwLock;

pub const LEFT_SIDEBAR_OPEN_KEY: &str = "leftSidebarOpen";
pub const RIGHT_PANEL_OPEN_KEY: &str = "rightPanelOpen";
pub const LAST_ACTIVE_CANVAS_KEY: &str = "lastActiveCanvasId";

/// Preferences backend.
pub trait Preferences: StorageBounds {
    fn get_preference(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Value>>>;

    fn set_preference(&self, key: &str, value: Value) -> BoxFuture<'_, StorageResult<()>>;
}

/// Typed read with a fallback for missing, unreadable or mistyped values.
pub async fn get_preference_or<T: DeserializeOwned>(
    preferences: &dyn Preferences,
    key: &str,
    fallback: T,
) -> T {
    match preferences.get_preference(key).await {
        Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
            log::warn!("Preference '{}' has unexpected type: {}", key, e);
            fallback
        }),
        Ok(None) => fallback,
        Err(e) => {
            log::warn!("Failed to read preference '{}': {}", key, e);
            fallback
        }
    }
}

/// Typed write.
pub async fn set_preference_value<T: Serialize>(
    preferences: &dyn Preferences,
    key: &str,
    value: T,
) -> StorageResult<()> {
    let value =
        serde_json::to_value(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
    preferences.set_preference(key, value).await
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

/// In-memory preferences for testing and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RwLock<Map<String, Value>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Preferences for MemoryPreferences {
    fn get_preference(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Value>>> {
        let key = key.to_string();
        Box::pin(async move {
            let values = self.values.read().map_err(lock_error)?;
            Ok(values.get(&key).cloned())
        })
    }

    fn set_preference(&self, key: &str, value: Value) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut values = self.values.write().map_err(lock_error)?;
            values.insert(key, value);
            Ok(())
        })
    }
}

/// Preferences kept as one JSON object on disk.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct FilePreferences {
    path: std::path::PathBuf,
    values: RwLock<Map<String, Value>>,
}

#[cfg(not(target_arch = "wasm32"))]
impl FilePreferences {
    /// Open the preferences file, starting empty when it is missing or unreadable.
    pub fn open(path: std::path::PathBuf) -> Self {
        let values = std::fs::read_to_string(&path)
            .ok()
            .and_then(|json| match serde_json::from_str::<Map<String, Value>>(&json) {
                Ok(values) => Some(values),
                Err(e) => {
                    log::warn!("Ignoring malformed preferences {}: {}", path.display(), e);
                    None
                }
            })
            .unwrap_or_default();
        Self {
            path,
            values: RwLock::new(values),
        }
    }

    /// Preferences in the default location.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Ok(Self::open(base.join("easel").join("preferences.json")))
    }

    fn persist(&self, values: &Map<String, Value>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Io(format!("Failed to create directory: {}", e)))?;
        }
        let json = serde_json::to_string_pretty(values)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| {
            StorageError::Io(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Preferences for FilePreferences {
    fn get_preference(&self, key: &str) -> BoxFuture<'_, StorageResult<Option<Value>>> {
        let key = key.to_string();
        Box::pin(async move {
            let values = self.values.read().map_err(lock_error)?;
            Ok(values.get(&key).cloned())
        })
    }

    fn set_preference(&self, key: &str, value: Value) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut values = self.values.write().map_err(lock_error)?;
            values.insert(key, value);
            self.persist(&values)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;
    use serde_json::json;

    #[test]
    fn test_fallback_when_missing_or_mistyped() {
        let prefs = MemoryPreferences::new();
        assert!(block_on(get_preference_or(&prefs, LEFT_SIDEBAR_OPEN_KEY, true)));

        block_on(prefs.set_preference(LEFT_SIDEBAR_OPEN_KEY, json!("yes"))).unwrap();
        assert!(!block_on(get_preference_or(&prefs, LEFT_SIDEBAR_OPEN_KEY, false)));

        block_on(set_preference_value(&prefs, LEFT_SIDEBAR_OPEN_KEY, true)).unwrap();
        assert!(block_on(get_preference_or(&prefs, LEFT_SIDEBAR_OPEN_KEY, false)));
    }

    #[test]
    fn test_file_preferences_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.json");
        let prefs = FilePreferences::open(path.clone());
        block_on(set_preference_value(&prefs, LAST_ACTIVE_CANVAS_KEY, "doc-1")).unwrap();

        let reopened = FilePreferences::open(path);
        let id: String = block_on(get_preference_or(
            &reopened,
            LAST_ACTIVE_CANVAS_KEY,
            String::new(),
        ));
        assert_eq!(id, "doc-1");
    }

    #[test]
    fn test_malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "[1, 2").unwrap();
        let prefs = FilePreferences::open(path);
        assert_eq!(block_on(prefs.get_preference(RIGHT_PANEL_OPEN_KEY)).unwrap(), None);
    }
}
