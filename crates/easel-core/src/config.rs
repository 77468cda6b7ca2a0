//! Editor configuration.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {message}")]
    Io { path: String, message: String },
    #[error("Invalid config: {0}")]
    Parse(String),
}

/// Tunable constants of the canvas controller.
///
/// Every field has a default, so a config file only needs the keys it
/// wants to override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of retained history snapshots.
    pub history_limit: usize,
    /// Quiet period before a scheduled autosave fires, in milliseconds.
    pub autosave_delay_ms: u64,
    /// Grid size used when snapping is enabled.
    pub grid_size: f64,
    /// Offset applied to pasted objects.
    pub paste_offset: f64,
    /// Offset applied to duplicated objects.
    pub duplicate_offset: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Base raised to the wheel delta when pinch-zooming.
    pub wheel_zoom_base: f64,
    /// Factor used by the zoom in/out buttons.
    pub zoom_step: f64,
    /// Drags smaller than this in both axes count as clicks.
    pub min_draw_size: f64,
    /// Size given to a clicked (not dragged) rectangle or ellipse.
    pub default_shape_size: Size,
    /// Size given to a clicked (not dragged) frame.
    pub default_frame_size: Size,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 50,
            autosave_delay_ms: 2000,
            grid_size: 10.0,
            paste_offset: 20.0,
            duplicate_offset: 20.0,
            min_zoom: 0.1,
            max_zoom: 20.0,
            wheel_zoom_base: 0.977,
            zoom_step: 1.2,
            min_draw_size: 2.0,
            default_shape_size: Size::new(100.0, 100.0),
            default_frame_size: Size::new(375.0, 667.0),
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load a config file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// The autosave quiet period.
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    /// Clamp a zoom level to the configured bounds.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.autosave_delay(), Duration::from_secs(2));
        assert!((config.grid_size - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{"historyLimit": 10, "gridSize": 8}"#).unwrap();
        assert_eq!(config.history_limit, 10);
        assert!((config.grid_size - 8.0).abs() < f64::EPSILON);
        assert!((config.max_zoom - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            EditorConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_clamp_zoom() {
        let config = EditorConfig::default();
        assert!((config.clamp_zoom(0.01) - 0.1).abs() < f64::EPSILON);
        assert!((config.clamp_zoom(50.0) - 20.0).abs() < f64::EPSILON);
        assert!((config.clamp_zoom(2.5) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("easel.json");
        std::fs::write(&path, r#"{"pasteOffset": 5}"#).unwrap();
        let config = EditorConfig::load(&path).unwrap();
        assert!((config.paste_offset - 5.0).abs() < f64::EPSILON);
    }
}
