//! Property panel model for a single selected object.

use crate::shapes::{
    DEFAULT_FONT_FAMILY, FontStyle, FontWeight, RenderObject, SerializableColor, Shape, TextAlign,
};
use serde::Serialize;
use serde_json::Value;

const DEFAULT_COLOR: &str = "#000000";
const DEFAULT_FONT_SIZE: f64 = 20.0;
const DEFAULT_LINE_HEIGHT: f64 = 1.16;

/// Editable properties of one object, as shown in the panel.
///
/// Position, size and rotation are rounded to whole units.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectProperties {
    pub x: f64,
    pub y: f64,
    /// Width with scale applied.
    pub width: f64,
    /// Height with scale applied.
    pub height: f64,
    pub rotation: f64,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
    pub corner_radius: f64,
    pub object_type: &'static str,
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_align: TextAlign,
    pub line_height: f64,
    pub char_spacing: f64,
}

impl ObjectProperties {
    pub fn of(render: &RenderObject) -> Self {
        let geometry = &render.geometry;
        let size = geometry.scaled_size();
        let hex = |color: Option<SerializableColor>| {
            color.map_or_else(|| DEFAULT_COLOR.to_string(), |c| c.to_hex())
        };
        let corner_radius = match &render.shape {
            Shape::Rectangle(rect) => rect.corner_radius,
            _ => 0.0,
        };
        let text = match &render.shape {
            Shape::Text(text) => Some(text),
            _ => None,
        };

        Self {
            x: geometry.left.round(),
            y: geometry.top.round(),
            width: size.width.round(),
            height: size.height.round(),
            rotation: geometry.angle.round(),
            fill: hex(render.style.fill),
            stroke: hex(render.style.stroke),
            stroke_width: render.style.stroke_width,
            opacity: render.style.opacity,
            corner_radius,
            object_type: render.shape.type_name(),
            font_family: text.map_or_else(
                || DEFAULT_FONT_FAMILY.to_string(),
                |t| t.font_family.clone(),
            ),
            font_size: text.map_or(DEFAULT_FONT_SIZE, |t| t.font_size),
            font_weight: text.map(|t| t.font_weight).unwrap_or_default(),
            font_style: text.map(|t| t.font_style).unwrap_or_default(),
            text_align: text.map(|t| t.text_align).unwrap_or_default(),
            line_height: text.map_or(DEFAULT_LINE_HEIGHT, |t| t.line_height),
            char_spacing: text.map_or(0.0, |t| t.char_spacing),
        }
    }
}

/// A single property edit from the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyUpdate {
    X(f64),
    Y(f64),
    /// Target width with scale applied; adjusts the horizontal scale.
    Width(f64),
    /// Target height with scale applied; adjusts the vertical scale.
    Height(f64),
    Rotation(f64),
    Fill(SerializableColor),
    Stroke(SerializableColor),
    StrokeWidth(f64),
    Opacity(f64),
    CornerRadius(f64),
    FontFamily(String),
    FontSize(f64),
    FontWeight(FontWeight),
    FontStyle(FontStyle),
    TextAlign(TextAlign),
    LineHeight(f64),
    CharSpacing(f64),
}

impl PropertyUpdate {
    /// Build an update from a panel field key and a JSON value.
    pub fn from_key_value(key: &str, value: &Value) -> Option<Self> {
        let number = || value.as_f64();
        let text = || value.as_str();
        let update = match key {
            "x" => PropertyUpdate::X(number()?),
            "y" => PropertyUpdate::Y(number()?),
            "width" => PropertyUpdate::Width(number()?),
            "height" => PropertyUpdate::Height(number()?),
            "rotation" => PropertyUpdate::Rotation(number()?),
            "fill" => PropertyUpdate::Fill(SerializableColor::from_hex(text()?)?),
            "stroke" => PropertyUpdate::Stroke(SerializableColor::from_hex(text()?)?),
            "strokeWidth" => PropertyUpdate::StrokeWidth(number()?),
            "opacity" => PropertyUpdate::Opacity(number()?),
            "cornerRadius" => PropertyUpdate::CornerRadius(number()?),
            "fontFamily" => PropertyUpdate::FontFamily(text()?.to_string()),
            "fontSize" => PropertyUpdate::FontSize(number()?),
            "fontWeight" => {
                let weight = match value {
                    Value::Number(n) => FontWeight::parse(&n.to_string()),
                    _ => FontWeight::parse(text()?),
                };
                PropertyUpdate::FontWeight(weight?)
            }
            "fontStyle" => PropertyUpdate::FontStyle(FontStyle::parse(text()?)?),
            "textAlign" => PropertyUpdate::TextAlign(TextAlign::parse(text()?)?),
            "lineHeight" => PropertyUpdate::LineHeight(number()?),
            "charSpacing" => PropertyUpdate::CharSpacing(number()?),
            _ => return None,
        };
        Some(update)
    }

    /// Apply to a render object. Returns false when the property does not
    /// exist on this kind of object.
    pub fn apply(&self, render: &mut RenderObject) -> bool {
        match self {
            PropertyUpdate::X(x) => render.geometry.left = *x,
            PropertyUpdate::Y(y) => render.geometry.top = *y,
            PropertyUpdate::Width(width) => {
                let intrinsic = render.geometry.width;
                if intrinsic > 0.0 {
                    render.geometry.scale_x = width / intrinsic;
                } else {
                    let height = render.geometry.height;
                    render.set_size(*width, height);
                    render.geometry.scale_x = 1.0;
                }
            }
            PropertyUpdate::Height(height) => {
                let intrinsic = render.geometry.height;
                if intrinsic > 0.0 {
                    render.geometry.scale_y = height / intrinsic;
                } else {
                    let width = render.geometry.width;
                    render.set_size(width, *height);
                    render.geometry.scale_y = 1.0;
                }
            }
            PropertyUpdate::Rotation(angle) => render.geometry.angle = angle.rem_euclid(360.0),
            PropertyUpdate::Fill(color) => render.style.fill = Some(*color),
            PropertyUpdate::Stroke(color) => render.style.stroke = Some(*color),
            PropertyUpdate::StrokeWidth(width) => render.style.stroke_width = width.max(0.0),
            PropertyUpdate::Opacity(opacity) => render.style.opacity = opacity.clamp(0.0, 1.0),
            PropertyUpdate::CornerRadius(radius) => match &mut render.shape {
                Shape::Rectangle(rect) => rect.corner_radius = radius.max(0.0),
                _ => return false,
            },
            PropertyUpdate::FontFamily(_)
            | PropertyUpdate::FontSize(_)
            | PropertyUpdate::FontWeight(_)
            | PropertyUpdate::FontStyle(_)
            | PropertyUpdate::TextAlign(_)
            | PropertyUpdate::LineHeight(_)
            | PropertyUpdate::CharSpacing(_) => return self.apply_text(render),
        }
        true
    }

    fn apply_text(&self, render: &mut RenderObject) -> bool {
        let Shape::Text(text) = &mut render.shape else {
            return false;
        };
        match self {
            PropertyUpdate::FontFamily(family) => text.font_family = family.clone(),
            PropertyUpdate::FontSize(size) if *size > 0.0 => text.font_size = *size,
            PropertyUpdate::FontWeight(weight) => text.font_weight = *weight,
            PropertyUpdate::FontStyle(style) => text.font_style = *style,
            PropertyUpdate::TextAlign(align) => text.text_align = *align,
            PropertyUpdate::LineHeight(height) if *height > 0.0 => text.line_height = *height,
            PropertyUpdate::CharSpacing(spacing) => text.char_spacing = *spacing,
            _ => return false,
        }
        let content = text.content.clone();
        render.set_text(&content);
        true
    }
}
