//! Domain records for scene objects.
//!
//! The live surface owns renderables; a [`SceneObject`] is the typed,
//! render-independent descriptor of one of them, linked back by its
//! [`SurfaceKey`].

mod store;

pub use store::{SceneStore, StoreChange, SubscriptionId};

use crate::shapes::Shape;
use crate::surface::SurfaceKey;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Custom properties that survive serialization. Anything else stored in
/// an object's property bag is dropped from snapshots.
pub const CUSTOM_FIELDS: [&str; 5] = ["id", "name", "isFrame", "isComponent", "parentId"];

/// Opaque unique object identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// A fresh identifier that has never been used.
    pub fn generate() -> Self {
        Self(format!("obj-{}", Uuid::new_v4()))
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Type of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectKind {
    Rectangle,
    Ellipse,
    Text,
    Frame,
}

impl ObjectKind {
    /// Kind of a renderable, given whether it is marked as a frame.
    pub fn of(shape: &Shape, is_frame: bool) -> Self {
        match shape {
            _ if is_frame => ObjectKind::Frame,
            Shape::Rectangle(_) => ObjectKind::Rectangle,
            Shape::Ellipse(_) => ObjectKind::Ellipse,
            Shape::Text(_) => ObjectKind::Text,
        }
    }

    /// Prefix for generated names.
    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::Rectangle => "Rectangle",
            ObjectKind::Ellipse => "Ellipse",
            ObjectKind::Text => "Text",
            ObjectKind::Frame => "Frame",
        }
    }
}

/// Typed view of an object's custom property bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_frame: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_component: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ObjectId>,
}

impl ObjectMeta {
    /// Metadata for a freshly created object.
    pub fn new(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn frame(id: ObjectId, name: impl Into<String>) -> Self {
        Self {
            is_frame: true,
            ..Self::new(id, name)
        }
    }

    /// Read the custom fields out of a property bag. Fields with the wrong
    /// type are ignored.
    pub fn from_properties(properties: &Map<String, Value>) -> Self {
        let mut meta = Self::default();
        if let Some(Value::String(id)) = properties.get("id") {
            meta.id = Some(ObjectId::new(id.as_str()));
        }
        if let Some(Value::String(name)) = properties.get("name") {
            meta.name = Some(name.clone());
        }
        meta.is_frame = matches!(properties.get("isFrame"), Some(Value::Bool(true)));
        meta.is_component = matches!(properties.get("isComponent"), Some(Value::Bool(true)));
        if let Some(Value::String(parent)) = properties.get("parentId") {
            meta.parent_id = Some(ObjectId::new(parent.as_str()));
        }
        meta
    }

    /// Write the custom fields into a property bag, removing unset ones.
    pub fn write_to(&self, properties: &mut Map<String, Value>) {
        for field in CUSTOM_FIELDS {
            properties.remove(field);
        }
        if let Ok(Value::Object(fields)) = serde_json::to_value(self) {
            properties.extend(fields);
        }
    }

    pub fn to_properties(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        self.write_to(&mut properties);
        properties
    }
}

/// Render-independent descriptor of one live object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub name: String,
    pub visible: bool,
    /// Derived from selectability.
    pub locked: bool,
    pub parent_id: Option<ObjectId>,
    pub is_frame: bool,
    pub is_component: bool,
    /// Axis-aligned scene bounds at the last sync.
    pub bounds: Rect,
    /// Link to the renderable on the live surface.
    #[serde(skip)]
    pub key: SurfaceKey,
}

impl SceneObject {
    pub fn contains_point(&self, point: Point) -> bool {
        crate::geometry::point_in_bounds(point, self.bounds)
    }
}

/// `"{prefix} {n}"` with the smallest positive `n` not already taken.
pub fn next_available_name<'a>(
    prefix: &str,
    existing: impl IntoIterator<Item = &'a str>,
) -> String {
    let taken: std::collections::HashSet<u64> = existing
        .into_iter()
        .filter_map(|name| name.strip_prefix(prefix)?.strip_prefix(' ')?.parse().ok())
        .collect();
    let n = (1..).find(|n| !taken.contains(n)).unwrap_or(1);
    format!("{} {}", prefix, n)
}
