//! The `.easel` document file format.

use super::{CanvasState, StorageError, StorageResult, timestamp};
use crate::surface::SCENE_VERSION;
use crate::viewport::IDENTITY_TRANSFORM;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current file format version.
pub const FORMAT_VERSION: u32 = 1;

/// File extension for documents, without the dot.
pub const EASEL_EXTENSION: &str = "easel";

/// Scene of a freshly created document.
pub fn default_canvas() -> Value {
    serde_json::json!({ "version": SCENE_VERSION, "objects": [] })
}

/// Saved view of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub zoom: f64,
    pub transform: Vec<f64>,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            transform: IDENTITY_TRANSFORM.to_vec(),
        }
    }
}

/// One document on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EaselFile {
    pub format_version: u32,
    pub name: String,
    pub canvas: Value,
    #[serde(default)]
    pub viewport: ViewportState,
    pub created_at: String,
    pub updated_at: String,
}

impl EaselFile {
    /// Empty document with the default canvas and identity view.
    pub fn new(name: &str) -> Self {
        let now = timestamp();
        Self {
            format_version: FORMAT_VERSION,
            name: name.to_string(),
            canvas: default_canvas(),
            viewport: ViewportState::default(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn to_json(&self) -> StorageResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> StorageResult<Self> {
        serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// The canvas state stored in this file.
    ///
    /// A transform of the wrong length falls back to identity.
    pub fn canvas_state(&self) -> StorageResult<CanvasState> {
        let json = serde_json::to_string(&self.canvas)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let viewport_transform: [f64; 6] = match self.viewport.transform.as_slice().try_into() {
            Ok(transform) => transform,
            Err(_) => {
                log::warn!(
                    "Ignoring malformed viewport transform in '{}' ({} values)",
                    self.name,
                    self.viewport.transform.len()
                );
                IDENTITY_TRANSFORM
            }
        };
        Ok(CanvasState {
            json,
            zoom: self.viewport.zoom,
            viewport_transform,
        })
    }

    /// Replace canvas and view, bumping `updated_at`.
    ///
    /// Fails without modifying the file when the scene JSON is malformed.
    pub fn apply_state(&mut self, state: &CanvasState) -> StorageResult<()> {
        let canvas: Value = serde_json::from_str(&state.json)
            .map_err(|e| StorageError::Serialization(format!("Invalid canvas JSON: {}", e)))?;
        self.canvas = canvas;
        self.viewport = ViewportState {
            zoom: state.zoom,
            transform: state.viewport_transform.to_vec(),
        };
        self.updated_at = timestamp();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl EaselFile {
    pub fn load(path: &std::path::Path) -> StorageResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content).map_err(|e| {
            StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Atomic write: the file is written next to `path` and renamed over it.
    pub fn save(&self, path: &std::path::Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Io(format!("Failed to create directory: {}", e)))?;
        }
        let json = self.to_json()?;
        let tmp_path = path.with_extension(format!("{}.tmp", EASEL_EXTENSION));
        std::fs::write(&tmp_path, json)
            .map_err(|e| StorageError::Io(format!("Failed to write temp file: {}", e)))?;
        std::fs::rename(&tmp_path, path)
            .map_err(|e| StorageError::Io(format!("Failed to rename temp file: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_file_layout() {
        let file = EaselFile::new("Untitled 1");
        let json: Value = serde_json::from_str(&file.to_json().unwrap()).unwrap();
        assert_eq!(json["formatVersion"], 1);
        assert_eq!(json["name"], "Untitled 1");
        assert_eq!(json["canvas"]["version"], "7.0.0");
        assert_eq!(json["viewport"]["zoom"], 1.0);
        assert_eq!(json["viewport"]["transform"].as_array().unwrap().len(), 6);
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn test_apply_state_rejects_malformed_scene() {
        let mut file = EaselFile::new("a");
        let before = file.clone();
        let state = CanvasState {
            json: "{oops".into(),
            ..CanvasState::default()
        };
        assert!(matches!(file.apply_state(&state), Err(StorageError::Serialization(_))));
        assert_eq!(file, before);
    }

    #[test]
    fn test_state_roundtrip_and_bad_transform() {
        let mut file = EaselFile::new("a");
        let state = CanvasState {
            json: r#"{"version":"7.0.0","objects":[]}"#.into(),
            zoom: 2.5,
            viewport_transform: [2.5, 0.0, 0.0, 2.5, 10.0, 20.0],
        };
        file.apply_state(&state).unwrap();
        assert_eq!(file.canvas_state().unwrap(), state);

        file.viewport.transform = vec![1.0, 2.0];
        assert_eq!(file.canvas_state().unwrap().viewport_transform, IDENTITY_TRANSFORM);
    }

    #[test]
    fn test_save_is_atomic_and_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.easel");
        let file = EaselFile::new("Saved");
        file.save(&path).unwrap();
        assert!(!path.with_extension("easel.tmp").exists());
        assert_eq!(EaselFile::load(&path).unwrap(), file);
    }
}
