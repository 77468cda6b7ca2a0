//! Storage abstraction for documents and preferences.

mod autosave;
mod easel;
mod memory;
mod preferences;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use autosave::{AutoSaveTimer, DEFAULT_AUTOSAVE_DELAY_MS, Duration, Instant};
pub use easel::{EASEL_EXTENSION, EaselFile, FORMAT_VERSION, ViewportState, default_canvas};
pub use memory::MemoryDocumentStore;
pub use preferences::{
    LAST_ACTIVE_CANVAS_KEY, LEFT_SIDEBAR_OPEN_KEY, MemoryPreferences, Preferences,
    RIGHT_PANEL_OPEN_KEY, get_preference_or, set_preference_value,
};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileDocumentStore;
#[cfg(not(target_arch = "wasm32"))]
pub use preferences::FilePreferences;

pub use crate::BoxFuture;

use crate::viewport::IDENTITY_TRANSFORM;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Thread-safety bounds for storage backends.
///
/// Native backends must be `Send + Sync`; on WASM the bounds are relaxed
/// since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait StorageBounds: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> StorageBounds for T {}

#[cfg(target_arch = "wasm32")]
pub trait StorageBounds {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> StorageBounds for T {}

/// Listing entry for a stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub id: String,
    pub name: String,
    pub sort_order: u32,
    /// RFC 3339 UTC timestamp.
    pub created_at: String,
    /// RFC 3339 UTC timestamp.
    pub updated_at: String,
}

impl DocumentMeta {
    /// Metadata for a fresh document with a generated id.
    pub fn new(name: impl Into<String>, sort_order: u32) -> Self {
        let now = timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            sort_order,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Saved canvas: serialized scene plus the view it was left at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasState {
    pub json: String,
    pub zoom: f64,
    pub viewport_transform: [f64; 6],
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            json: default_canvas().to_string(),
            zoom: 1.0,
            viewport_transform: IDENTITY_TRANSFORM,
        }
    }
}

/// Document persistence backend.
///
/// Implementations can keep documents in memory or on the filesystem.
pub trait DocumentStore: StorageBounds {
    /// All documents ordered by sort order.
    fn list_documents(&self) -> BoxFuture<'_, StorageResult<Vec<DocumentMeta>>>;

    /// Create an empty document.
    fn create_document(&self, name: &str) -> BoxFuture<'_, StorageResult<DocumentMeta>>;

    fn rename_document(&self, id: &str, name: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Delete a document. Deleting a missing document is not an error.
    fn delete_document(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Saved state, or `None` when nothing was ever saved for `id`.
    fn get_canvas_state(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<CanvasState>>>;

    fn save_canvas_state(
        &self,
        id: &str,
        state: &CanvasState,
    ) -> BoxFuture<'_, StorageResult<()>>;
}

/// Current time as an RFC 3339 UTC timestamp with second precision.
pub(crate) fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
