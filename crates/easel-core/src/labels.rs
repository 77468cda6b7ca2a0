//! Frame name labels painted over the canvas.

use crate::scene::ObjectMeta;
use crate::shapes::SerializableColor;
use crate::surface::Surface;
use kurbo::Point;

/// Vertical gap between a label's baseline and its frame, in screen pixels.
pub const LABEL_OFFSET: f64 = 8.0;
pub const LABEL_COLOR: SerializableColor = SerializableColor::rgb(0x99, 0x99, 0x99);
const MIN_FONT_SIZE: f64 = 11.0;
const MAX_FONT_SIZE: f64 = 14.0;

/// One label in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLabel {
    pub text: String,
    /// Baseline start in screen pixels.
    pub position: Point,
    pub font_size: f64,
    pub color: SerializableColor,
}

/// Font size that grows as the view zooms out, within `[11, 14]` px.
pub fn label_font_size(zoom: f64) -> f64 {
    if zoom <= 0.0 {
        return MAX_FONT_SIZE;
    }
    (MIN_FONT_SIZE / zoom).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

/// Labels for every visible frame on the surface, bottom-first.
pub fn frame_labels(surface: &dyn Surface) -> Vec<FrameLabel> {
    let vpt = surface.viewport_transform().as_coeffs();
    let font_size = label_font_size(surface.zoom());
    surface
        .objects()
        .iter()
        .filter(|object| object.render.visible)
        .filter_map(|object| {
            let meta = ObjectMeta::from_properties(&object.properties);
            if !meta.is_frame {
                return None;
            }
            let geometry = &object.render.geometry;
            let x = geometry.left * vpt[0] + vpt[4];
            let y = geometry.top * vpt[3] + vpt[5];
            Some(FrameLabel {
                text: meta.name.unwrap_or_default(),
                position: Point::new(x, y - LABEL_OFFSET),
                font_size,
                color: LABEL_COLOR,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ObjectId;
    use crate::shapes::{Geometry, Rectangle, RenderObject, Shape, ShapeStyle};
    use crate::surface::MemorySurface;
    use kurbo::Vec2;

    #[test]
    fn test_font_size_clamped() {
        assert!((label_font_size(1.0) - 11.0).abs() < f64::EPSILON);
        assert!((label_font_size(4.0) - 11.0).abs() < f64::EPSILON);
        assert!((label_font_size(0.9) - 11.0 / 0.9).abs() < 1e-9);
        assert!((label_font_size(0.1) - 14.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_labels_follow_viewport() {
        let mut surface = MemorySurface::new();
        let frame = RenderObject::new(
            Shape::Rectangle(Rectangle::default()),
            Geometry::new(100.0, 50.0, 375.0, 667.0),
            ShapeStyle::frame_default(),
        );
        surface.add(frame, ObjectMeta::frame(ObjectId::from("f"), "Frame 1").to_properties());
        let plain = RenderObject::new(
            Shape::Rectangle(Rectangle::default()),
            Geometry::new(0.0, 0.0, 10.0, 10.0),
            ShapeStyle::default(),
        );
        surface.add(plain, ObjectMeta::new(ObjectId::from("r"), "Rectangle 1").to_properties());

        surface.zoom_to_point(Point::ZERO, 2.0);
        surface.relative_pan(Vec2::new(10.0, 20.0));

        let labels = frame_labels(&surface);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].text, "Frame 1");
        assert_eq!(labels[0].position, Point::new(210.0, 112.0));
        assert!((labels[0].font_size - 11.0).abs() < f64::EPSILON);
    }
}
