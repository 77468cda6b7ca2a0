//! Rendered surface abstraction.
//!
//! The surface is the drawing engine the controller drives: it owns the
//! renderables, the viewport, native selection and transform handling,
//! and inline text editing. It reports what happened through a queue of
//! [`SurfaceEvent`]s that the controller drains after each call.

mod memory;

pub use memory::MemorySurface;

use crate::BoxFuture;
use crate::labels::FrameLabel;
use crate::shapes::RenderObject;
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Version tag written into serialized scenes.
pub const SCENE_VERSION: &str = "7.0.0";

/// Surface errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Failed to parse scene: {0}")]
    Parse(String),
    #[error("Failed to serialize scene: {0}")]
    Serialize(String),
}

/// Stable handle to an object on one surface. Never reused by that surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceKey(pub(crate) u64);

/// A renderable plus its custom property bag.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceObject {
    pub key: SurfaceKey,
    pub render: RenderObject,
    pub properties: Map<String, Value>,
}

/// Something the surface did that the controller may react to.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    ObjectAdded(SurfaceKey),
    ObjectRemoved(SurfaceKey),
    /// A transform or style change was committed.
    ObjectModified(SurfaceKey),
    /// An object moved during an in-progress drag.
    ObjectMoving(SurfaceKey),
    SelectionCreated(Vec<SurfaceKey>),
    SelectionUpdated(Vec<SurfaceKey>),
    SelectionCleared,
    TextEditingEntered(SurfaceKey),
    TextEditingExited(SurfaceKey),
    TextChanged(SurfaceKey),
}

/// Pointer cursor shown over the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
    Grab,
    Grabbing,
    Text,
}

/// Serialized scene: objects bottom-first with their allowlisted properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDescription {
    pub version: String,
    #[serde(default)]
    pub objects: Vec<SerializedObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedObject {
    #[serde(flatten)]
    pub render: RenderObject,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl SceneDescription {
    /// Snapshot of a surface, keeping only allowlisted custom properties.
    pub fn capture(objects: &[SurfaceObject], allowlist: &[&str]) -> Self {
        Self {
            version: SCENE_VERSION.to_string(),
            objects: objects
                .iter()
                .map(|object| SerializedObject {
                    render: object.render.clone(),
                    properties: object
                        .properties
                        .iter()
                        .filter(|(k, _)| allowlist.contains(&k.as_str()))
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, SurfaceError> {
        serde_json::to_string(self).map_err(|e| SurfaceError::Serialize(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SurfaceError> {
        serde_json::from_str(json).map_err(|e| SurfaceError::Parse(e.to_string()))
    }
}

/// The drawing engine driven by the canvas controller.
///
/// Objects are ordered bottom-first. Mutating calls that add, remove or
/// commit objects queue events; programmatic edits through
/// [`Surface::get_mut`] do not.
pub trait Surface {
    // Objects

    fn objects(&self) -> &[SurfaceObject];

    fn get(&self, key: SurfaceKey) -> Option<&SurfaceObject> {
        self.objects().iter().find(|o| o.key == key)
    }

    fn get_mut(&mut self, key: SurfaceKey) -> Option<&mut SurfaceObject>;

    fn index_of(&self, key: SurfaceKey) -> Option<usize> {
        self.objects().iter().position(|o| o.key == key)
    }

    /// Append on top of the stack.
    fn add(&mut self, render: RenderObject, properties: Map<String, Value>) -> SurfaceKey;

    /// Insert at a z-index, clamped to the stack length.
    fn insert_at(
        &mut self,
        index: usize,
        render: RenderObject,
        properties: Map<String, Value>,
    ) -> SurfaceKey;

    fn remove(&mut self, key: SurfaceKey) -> Option<SurfaceObject>;

    /// Remove every object.
    fn clear(&mut self);

    fn bring_to_front(&mut self, key: SurfaceKey) -> bool;

    fn send_to_back(&mut self, key: SurfaceKey) -> bool;

    /// Top-most visible, evented object whose bounds contain a scene point.
    fn hit_test(&self, point: Point) -> Option<SurfaceKey> {
        self.objects()
            .iter()
            .rev()
            .filter(|o| o.render.visible && o.render.evented)
            .find(|o| crate::geometry::point_in_bounds(point, o.render.bounds()))
            .map(|o| o.key)
    }

    /// Mark an object as committed after a programmatic change.
    fn commit(&mut self, key: SurfaceKey);

    // Serialization

    /// Serialize all objects, keeping only allowlisted custom properties.
    fn to_json(&self, allowlist: &[&str]) -> Result<String, SurfaceError>;

    /// Replace all objects with a serialized scene.
    fn load_from_json(&mut self, json: &str) -> BoxFuture<'_, Result<(), SurfaceError>>;

    // Viewport

    fn viewport_transform(&self) -> Affine;

    fn set_viewport_transform(&mut self, transform: Affine);

    fn zoom(&self) -> f64;

    /// Set zoom keeping the screen origin fixed.
    fn set_zoom(&mut self, zoom: f64) {
        self.zoom_to_point(Point::ZERO, zoom);
    }

    /// Set zoom keeping a screen point fixed.
    fn zoom_to_point(&mut self, pivot: Point, zoom: f64);

    /// Pan by a delta in screen pixels.
    fn relative_pan(&mut self, delta: Vec2);

    /// Size of the drawing area in screen pixels.
    fn size(&self) -> Size;

    fn scene_point(&self, screen: Point) -> Point {
        self.viewport_transform().inverse() * screen
    }

    // Interaction

    /// Enable or disable marquee (drag-to-select) on empty space.
    fn set_selection_enabled(&mut self, enabled: bool);

    fn selection_enabled(&self) -> bool;

    fn set_cursor(&mut self, cursor: Cursor);

    fn cursor(&self) -> Cursor;

    fn active_keys(&self) -> &[SurfaceKey];

    /// Replace the active selection.
    fn set_active(&mut self, keys: Vec<SurfaceKey>);

    /// Clear the active selection.
    fn discard_active(&mut self);

    /// Native press handling: handle hits, selection and drag start.
    /// Returns the object under the pointer.
    fn pointer_down(&mut self, point: Point) -> Option<SurfaceKey>;

    fn pointer_move(&mut self, point: Point);

    fn pointer_up(&mut self, point: Point);

    // Text editing

    fn enter_text_editing(&mut self, key: SurfaceKey) -> bool;

    fn exit_text_editing(&mut self);

    fn editing_key(&self) -> Option<SurfaceKey>;

    /// Select the full content of the text being edited.
    fn select_all_text(&mut self);

    /// Selected character range of the text being edited.
    fn text_selection(&self) -> Option<(usize, usize)>;

    /// Replace the selected range of the text being edited.
    fn type_text(&mut self, text: &str);

    // Events and painting

    fn drain_events(&mut self) -> Vec<SurfaceEvent>;

    /// Paint the scene with overlay labels on top.
    fn render(&mut self, overlay: &[FrameLabel]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Geometry, Rectangle, Shape, ShapeStyle};
    use serde_json::json;

    #[test]
    fn test_capture_filters_properties() {
        let mut properties = Map::new();
        properties.insert("id".into(), json!("a"));
        properties.insert("scratch".into(), json!(true));
        let object = SurfaceObject {
            key: SurfaceKey(1),
            render: RenderObject::new(
                Shape::Rectangle(Rectangle::default()),
                Geometry::new(0.0, 0.0, 1.0, 1.0),
                ShapeStyle::default(),
            ),
            properties,
        };
        let scene = SceneDescription::capture(&[object], &["id"]);
        let json = scene.to_json().unwrap();
        assert!(json.contains("\"id\":\"a\""));
        assert!(!json.contains("scratch"));

        let back = SceneDescription::from_json(&json).unwrap();
        assert_eq!(back.version, SCENE_VERSION);
        assert_eq!(back.objects[0].properties.get("id"), Some(&json!("a")));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            SceneDescription::from_json("{\"objects\": 3}"),
            Err(SurfaceError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_default_canvas_parses() {
        let scene = SceneDescription::from_json(r#"{"version":"7.0.0","objects":[]}"#).unwrap();
        assert!(scene.objects.is_empty());
    }
}
