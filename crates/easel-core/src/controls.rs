//! Selection control styling and handle geometry.
//!
//! The surface is constructed with a [`ControlStyle`] describing how
//! selected objects are decorated and which handles they expose.

use crate::shapes::SerializableColor;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Unit direction pointing outward from the box center.
    fn outward(self) -> Vec2 {
        match self {
            Corner::TopLeft => Vec2::new(-1.0, -1.0),
            Corner::TopRight => Vec2::new(1.0, -1.0),
            Corner::BottomLeft => Vec2::new(-1.0, 1.0),
            Corner::BottomRight => Vec2::new(1.0, 1.0),
        }
    }

    /// The diagonally opposite corner.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// Position of this corner on an axis-aligned rect.
    pub fn of(self, rect: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(rect.x0, rect.y0),
            Corner::TopRight => Point::new(rect.x1, rect.y0),
            Corner::BottomLeft => Point::new(rect.x0, rect.y1),
            Corner::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Visible corner square, scales the object.
    Corner(Corner),
    /// Edge midpoint square, scales along one axis.
    Edge(Edge),
    /// Rotation knob above the top edge.
    Rotate,
    /// Invisible rotation area just outside a corner.
    RotationZone(Corner),
}

impl HandleKind {
    pub fn is_rotation(&self) -> bool {
        matches!(self, HandleKind::Rotate | HandleKind::RotationZone(_))
    }
}

/// A handle with its scene position and hit size.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    /// Center in scene coordinates.
    pub position: Point,
    /// Side of the square hit area, in scene units.
    pub size: f64,
    pub kind: HandleKind,
    /// Whether the handle is painted.
    pub visible: bool,
}

impl Handle {
    /// Check if a scene point falls in this handle's square.
    pub fn hit_test(&self, point: Point) -> bool {
        let half = self.size / 2.0;
        (point.x - self.position.x).abs() <= half && (point.y - self.position.y).abs() <= half
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CornerShape {
    #[default]
    Rect,
    Circle,
}

/// Invisible rotation areas placed diagonally outside each corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationZones {
    /// Outward offset from the corner on each axis, in screen pixels.
    pub offset: f64,
    /// Side of the square area, in screen pixels.
    pub size: f64,
}

/// Declarative styling for selection decorations.
///
/// Sizes are in screen pixels and are divided by the zoom level when
/// converted to scene-space handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlStyle {
    pub border_color: SerializableColor,
    pub border_scale_factor: f64,
    pub border_opacity_when_moving: f64,
    pub corner_color: SerializableColor,
    pub corner_stroke_color: SerializableColor,
    pub corner_size: f64,
    pub corner_shape: CornerShape,
    pub transparent_corners: bool,
    /// Gap between the object and its selection border.
    pub padding: f64,
    /// Show scale handles on edge midpoints.
    pub edge_handles: bool,
    /// Show a standalone rotation knob above the top edge.
    pub rotate_handle: bool,
    pub rotation_zones: Option<RotationZones>,
}

/// Distance from the top edge to the standalone rotation knob.
const ROTATE_HANDLE_OFFSET: f64 = 25.0;

impl Default for ControlStyle {
    fn default() -> Self {
        Self {
            border_color: SerializableColor::rgb(0x4f, 0x8e, 0xf7),
            border_scale_factor: 1.5,
            border_opacity_when_moving: 0.6,
            corner_color: SerializableColor::white(),
            corner_stroke_color: SerializableColor::rgb(0x4f, 0x8e, 0xf7),
            corner_size: 6.0,
            corner_shape: CornerShape::Rect,
            transparent_corners: false,
            padding: 0.0,
            edge_handles: false,
            rotate_handle: false,
            rotation_zones: Some(RotationZones {
                offset: 10.0,
                size: 18.0,
            }),
        }
    }
}

impl ControlStyle {
    /// Handles for an object with the given unrotated bounds and angle (degrees).
    pub fn handles(&self, bounds: Rect, angle: f64, zoom: f64) -> Vec<Handle> {
        let zoom = if zoom > 0.0 { zoom } else { 1.0 };
        let bounds = bounds.inflate(self.padding / zoom, self.padding / zoom);
        let center = bounds.center();
        let (sin, cos) = angle.to_radians().sin_cos();
        let rotate = |p: Point| -> Point {
            let d = p - center;
            Point::new(
                center.x + d.x * cos - d.y * sin,
                center.y + d.x * sin + d.y * cos,
            )
        };
        let corner_size = self.corner_size / zoom;

        let mut handles: Vec<Handle> = Corner::ALL
            .iter()
            .map(|&corner| Handle {
                position: rotate(corner.of(bounds)),
                size: corner_size,
                kind: HandleKind::Corner(corner),
                visible: true,
            })
            .collect();

        if self.edge_handles {
            let mid = |a: Point, b: Point| a.midpoint(b);
            let edges = [
                (Edge::Top, mid(Corner::TopLeft.of(bounds), Corner::TopRight.of(bounds))),
                (Edge::Right, mid(Corner::TopRight.of(bounds), Corner::BottomRight.of(bounds))),
                (Edge::Bottom, mid(Corner::BottomLeft.of(bounds), Corner::BottomRight.of(bounds))),
                (Edge::Left, mid(Corner::TopLeft.of(bounds), Corner::BottomLeft.of(bounds))),
            ];
            handles.extend(edges.into_iter().map(|(edge, position)| Handle {
                position: rotate(position),
                size: corner_size,
                kind: HandleKind::Edge(edge),
                visible: true,
            }));
        }

        if self.rotate_handle {
            let top_center = Point::new(center.x, bounds.y0 - ROTATE_HANDLE_OFFSET / zoom);
            handles.push(Handle {
                position: rotate(top_center),
                size: corner_size,
                kind: HandleKind::Rotate,
                visible: true,
            });
        }

        if let Some(zones) = self.rotation_zones {
            let offset = zones.offset / zoom;
            handles.extend(Corner::ALL.iter().map(|&corner| Handle {
                position: rotate(corner.of(bounds) + corner.outward() * offset),
                size: zones.size / zoom,
                kind: HandleKind::RotationZone(corner),
                visible: false,
            }));
        }

        handles
    }

    /// First handle under a scene point. Visible handles take precedence
    /// over the invisible rotation zones they overlap.
    pub fn hit_test(
        &self,
        bounds: Rect,
        angle: f64,
        zoom: f64,
        point: Point,
    ) -> Option<HandleKind> {
        let handles = self.handles(bounds, angle, zoom);
        handles
            .iter()
            .filter(|h| h.visible)
            .chain(handles.iter().filter(|h| !h.visible))
            .find(|h| h.hit_test(point))
            .map(|h| h.kind)
    }
}
