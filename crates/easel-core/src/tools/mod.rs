//! Tool system for the canvas.

use crate::config::EditorConfig;
use crate::shapes::{Ellipse, Geometry, Rectangle, RenderObject, Shape, ShapeStyle};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Hand,
    Rectangle,
    Ellipse,
    Text,
    Frame,
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Select,
        ToolKind::Rectangle,
        ToolKind::Ellipse,
        ToolKind::Text,
        ToolKind::Frame,
        ToolKind::Hand,
    ];

    /// Single-key shortcut for this tool.
    pub fn shortcut(self) -> char {
        match self {
            ToolKind::Select => 'v',
            ToolKind::Rectangle => 'r',
            ToolKind::Ellipse => 'o',
            ToolKind::Text => 't',
            ToolKind::Frame => 'f',
            ToolKind::Hand => 'h',
        }
    }

    /// Tool bound to a shortcut key, case-insensitive.
    pub fn from_shortcut(key: char) -> Option<ToolKind> {
        let key = key.to_ascii_lowercase();
        Self::ALL.into_iter().find(|tool| tool.shortcut() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Hand => "Hand",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Ellipse => "Ellipse",
            ToolKind::Text => "Text",
            ToolKind::Frame => "Frame",
        }
    }

    /// Tools that drag out a new shape.
    pub fn draws_shape(self) -> bool {
        matches!(self, ToolKind::Rectangle | ToolKind::Ellipse | ToolKind::Frame)
    }
}

/// Box spanned by a drag from `start` to `current`: min corner plus absolute size.
pub fn drag_rect(start: Point, current: Point) -> Rect {
    Rect::new(
        start.x.min(current.x),
        start.y.min(current.y),
        start.x.max(current.x),
        start.y.max(current.y),
    )
}

/// Zero-size render object for a drawing tool, anchored at `point`.
///
/// Returns `None` for tools that don't drag out shapes.
pub fn seed_shape(tool: ToolKind, point: Point) -> Option<RenderObject> {
    let geometry = Geometry::at(point);
    let object = match tool {
        ToolKind::Rectangle => RenderObject::new(
            Shape::Rectangle(Rectangle::default()),
            geometry,
            ShapeStyle::shape_default(),
        ),
        ToolKind::Ellipse => RenderObject::new(
            Shape::Ellipse(Ellipse::default()),
            geometry,
            ShapeStyle::shape_default(),
        ),
        ToolKind::Frame => RenderObject::new(
            Shape::Rectangle(Rectangle::default()),
            geometry,
            ShapeStyle::frame_default(),
        ),
        ToolKind::Select | ToolKind::Hand | ToolKind::Text => return None,
    };
    Some(object)
}

/// Final size of a drawn shape. A drag below the minimum in both axes is
/// treated as a click and gets the tool's default size.
pub fn settle_size(tool: ToolKind, drawn: Size, config: &EditorConfig) -> Size {
    if drawn.width < config.min_draw_size && drawn.height < config.min_draw_size {
        if tool == ToolKind::Frame {
            config.default_frame_size
        } else {
            config.default_shape_size
        }
    } else {
        drawn
    }
}
