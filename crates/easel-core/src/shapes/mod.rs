//! Renderable shape payloads.
//!
//! A [`RenderObject`] is what the drawing surface paints: geometry, style
//! and a kind-specific [`Shape`]. Domain identity (id, name, frame
//! relations) lives in [`crate::scene::SceneObject`], which links to the
//! render object through a surface key.

mod ellipse;
mod rectangle;
mod text;

pub use ellipse::Ellipse;
pub use rectangle::Rectangle;
pub use text::{DEFAULT_FONT_FAMILY, FontStyle, FontWeight, Text, TextAlign};

use kurbo::{Affine, BezPath, Point, Rect, Shape as _, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().strip_prefix('#')?;
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(digits.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 17;
                }
                Some(Self::rgb(out[0], out[1], out[2]))
            }
            6 => Some(Self::rgb(
                channel(digits.get(0..2)?)?,
                channel(digits.get(2..4)?)?,
                channel(digits.get(4..6)?)?,
            )),
            8 => Some(Self::new(
                channel(digits.get(0..2)?)?,
                channel(digits.get(2..4)?)?,
                channel(digits.get(4..6)?)?,
                channel(digits.get(6..8)?)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Perceptual luminance on normalized channels, in `[0, 1]`.
    pub fn luminance(&self) -> f64 {
        (0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64) / 255.0
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Fill and stroke of a render object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    /// Fill color (None = no fill).
    pub fill: Option<SerializableColor>,
    /// Stroke color (None = no stroke).
    pub stroke: Option<SerializableColor>,
    pub stroke_width: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl ShapeStyle {
    /// Light grey fill with a darker outline, used for new rectangles and ellipses.
    pub fn shape_default() -> Self {
        Self {
            fill: Some(SerializableColor::rgb(0xd9, 0xd9, 0xd9)),
            stroke: Some(SerializableColor::rgb(0xb3, 0xb3, 0xb3)),
            stroke_width: 1.0,
            opacity: 1.0,
        }
    }

    /// White artboard with a faint outline, used for new frames.
    pub fn frame_default() -> Self {
        Self {
            fill: Some(SerializableColor::white()),
            stroke: Some(SerializableColor::rgb(0xe0, 0xe0, 0xe0)),
            stroke_width: 1.0,
            opacity: 1.0,
        }
    }

    /// Solid text color without an outline.
    pub fn text(color: SerializableColor) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
            stroke_width: 0.0,
            opacity: 1.0,
        }
    }

    /// Get the fill color with opacity applied.
    pub fn fill_with_opacity(&self) -> Option<Color> {
        self.fill.map(|c| with_opacity(c, self.opacity))
    }

    /// Get the stroke color with opacity applied.
    pub fn stroke_with_opacity(&self) -> Option<Color> {
        self.stroke.map(|c| with_opacity(c, self.opacity))
    }
}

fn with_opacity(color: SerializableColor, opacity: f64) -> Color {
    let alpha = (color.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
    Color::from_rgba8(color.r, color.g, color.b, alpha)
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self::shape_default()
    }
}

/// Placement of an object in scene coordinates.
///
/// `left`/`top` locate the unrotated box; `width`/`height` are the
/// intrinsic size before scaling; `angle` is in degrees around the
/// scaled box center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
    #[serde(default)]
    pub angle: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl Geometry {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
        }
    }

    /// Zero-size geometry anchored at a point.
    pub fn at(point: Point) -> Self {
        Self::new(point.x, point.y, 0.0, 0.0)
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn set_origin(&mut self, point: Point) {
        self.left = point.x;
        self.top = point.y;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.left += delta.x;
        self.top += delta.y;
    }

    /// Size with scale applied.
    pub fn scaled_size(&self) -> Size {
        Size::new(self.width * self.scale_x, self.height * self.scale_y)
    }

    /// Axis-aligned bounds, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        let size = self.scaled_size();
        Rect::new(
            self.left,
            self.top,
            self.left + size.width,
            self.top + size.height,
        )
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Maps the intrinsic box `[0, width] x [0, height]` into scene space.
    pub fn transform(&self) -> Affine {
        let size = self.scaled_size();
        let pivot = Point::new(size.width / 2.0, size.height / 2.0);
        Affine::translate(Vec2::new(self.left, self.top))
            * Affine::rotate_about(self.angle.to_radians(), pivot)
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }
}

/// Kind-specific payload of a render object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Text(Text),
}

impl Shape {
    pub fn is_text(&self) -> bool {
        matches!(self, Shape::Text(_))
    }

    /// Short type label, also used for fallback names.
    pub fn type_name(&self) -> &'static str {
        match self {
            Shape::Rectangle(_) => "rect",
            Shape::Ellipse(_) => "ellipse",
            Shape::Text(_) => "text",
        }
    }

    /// Outline in intrinsic (unscaled, unrotated) coordinates.
    pub fn outline(&self, geometry: &Geometry) -> BezPath {
        match self {
            Shape::Rectangle(rect) => rect.outline(geometry),
            Shape::Ellipse(ellipse) => ellipse.outline(),
            Shape::Text(_) => Rect::new(0.0, 0.0, geometry.width, geometry.height).to_path(0.1),
        }
    }
}

/// Everything the surface needs to paint and hit-test one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderObject {
    pub shape: Shape,
    pub geometry: Geometry,
    pub style: ShapeStyle,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub selectable: bool,
    #[serde(default = "default_true")]
    pub evented: bool,
}

fn default_true() -> bool {
    true
}

impl RenderObject {
    pub fn new(shape: Shape, geometry: Geometry, style: ShapeStyle) -> Self {
        Self {
            shape,
            geometry,
            style,
            visible: true,
            selectable: true,
            evented: true,
        }
    }

    /// Axis-aligned bounds in scene coordinates.
    pub fn bounds(&self) -> Rect {
        self.geometry.bounds()
    }

    /// Resize the intrinsic box, keeping kind-specific fields consistent.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.geometry.width = width;
        self.geometry.height = height;
        if let Shape::Ellipse(ellipse) = &mut self.shape {
            ellipse.rx = width / 2.0;
            ellipse.ry = height / 2.0;
        }
    }

    /// Replace text content and refit the box to it. No-op for other kinds.
    pub fn set_text(&mut self, content: &str) {
        if let Shape::Text(text) = &mut self.shape {
            text.content = content.to_string();
            let size = text.measure();
            self.geometry.width = size.width;
            self.geometry.height = size.height;
        }
    }
}
