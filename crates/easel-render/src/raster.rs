//! Software rasterizer for rectangles, ellipses and frames.
//!
//! Each pixel center is mapped back into an object's intrinsic box with
//! the inverse of its transform and tested against the outline there, so
//! rotation and scale need no special casing. Text is not rasterized.

use crate::{ExportError, ExportFormat, ExportResult, MAX_DIMENSION, object_bounds, visible_bounds};
use easel_core::shapes::{RenderObject, SerializableColor, Shape};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use kurbo::{Point, Rect, Shape as KurboShape};
use peniko::Color;
use std::io::Cursor;

/// Rendered pixels plus the scene box they cover.
#[derive(Debug, Clone)]
pub struct RasterImage {
    image: RgbaImage,
    scene_bounds: Rect,
}

impl RasterImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn scene_bounds(&self) -> Rect {
        self.scene_bounds
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<SerializableColor> {
        self.image
            .get_pixel_checked(x, y)
            .map(|Rgba([r, g, b, a])| SerializableColor::new(*r, *g, *b, *a))
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    /// Encode as PNG or JPEG. JPEG has no alpha, so the pixels are
    /// composited over white first.
    pub fn encode(&self, format: ExportFormat) -> ExportResult<Vec<u8>> {
        let mut bytes = Cursor::new(Vec::new());
        let result = match format {
            ExportFormat::Png => self.image.write_to(&mut bytes, ImageFormat::Png),
            ExportFormat::Jpeg => self.flatten().write_to(&mut bytes, ImageFormat::Jpeg),
            ExportFormat::Svg => {
                return Err(ExportError::Encode("SVG is not a raster format".into()));
            }
        };
        result.map_err(|e| ExportError::Encode(e.to_string()))?;
        Ok(bytes.into_inner())
    }

    fn flatten(&self) -> RgbImage {
        RgbImage::from_fn(self.width(), self.height(), |x, y| {
            let mut pixel = Rgba([255, 255, 255, 255]);
            let Rgba([r, g, b, a]) = *self.image.get_pixel(x, y);
            blend(&mut pixel, Color::from_rgba8(r, g, b, a));
            Rgb([pixel[0], pixel[1], pixel[2]])
        })
    }
}

/// Rasterize visible objects, bottom-first, over the union of their
/// bounds at `multiplier` pixels per scene unit.
pub fn rasterize(
    objects: &[&RenderObject],
    multiplier: f64,
    background: Option<SerializableColor>,
) -> ExportResult<RasterImage> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(ExportError::InvalidMultiplier(multiplier));
    }
    let bounds = visible_bounds(objects.iter().copied()).ok_or(ExportError::EmptyScene)?;
    let width = (bounds.width() * multiplier).ceil().max(1.0);
    let height = (bounds.height() * multiplier).ceil().max(1.0);
    if width > MAX_DIMENSION as f64 || height > MAX_DIMENSION as f64 {
        return Err(ExportError::TooLarge { width, height });
    }

    let fill = background
        .map(|c| Rgba([c.r, c.g, c.b, c.a]))
        .unwrap_or(Rgba([0, 0, 0, 0]));
    let mut canvas = Canvas {
        image: RgbaImage::from_pixel(width as u32, height as u32, fill),
        origin: bounds.origin(),
        multiplier,
    };
    for object in objects.iter().filter(|o| o.visible) {
        canvas.paint(object);
    }
    log::debug!("Rasterized {}x{} at {}x", canvas.image.width(), canvas.image.height(), multiplier);

    Ok(RasterImage {
        image: canvas.image,
        scene_bounds: bounds,
    })
}

struct Canvas {
    image: RgbaImage,
    origin: Point,
    multiplier: f64,
}

impl Canvas {
    fn scene_point(&self, x: u32, y: u32) -> Point {
        Point::new(
            self.origin.x + (x as f64 + 0.5) / self.multiplier,
            self.origin.y + (y as f64 + 0.5) / self.multiplier,
        )
    }

    /// Pixel columns and rows overlapping a scene box.
    fn pixel_span(&self, area: Rect) -> (std::ops::Range<u32>, std::ops::Range<u32>) {
        let to_px = |v: f64, origin: f64, limit: u32| {
            ((v - origin) * self.multiplier).clamp(0.0, limit as f64)
        };
        let (w, h) = self.image.dimensions();
        let x0 = to_px(area.x0, self.origin.x, w).floor() as u32;
        let x1 = to_px(area.x1, self.origin.x, w).ceil() as u32;
        let y0 = to_px(area.y0, self.origin.y, h).floor() as u32;
        let y1 = to_px(area.y1, self.origin.y, h).ceil() as u32;
        (x0..x1, y0..y1)
    }

    fn paint(&mut self, object: &RenderObject) {
        let Some(outline) = Outline::of(object) else {
            return;
        };
        let style = &object.style;
        let fill = style.fill_with_opacity();
        let stroke = style.stroke_with_opacity().filter(|_| style.stroke_width > 0.0);
        if fill.is_none() && stroke.is_none() {
            return;
        }

        let geometry = &object.geometry;
        let to_local = geometry.transform().inverse();
        let scale = (geometry.scale_x.abs() + geometry.scale_y.abs()) / 2.0;
        let half_stroke = if scale > 0.0 {
            style.stroke_width / 2.0 / scale
        } else {
            0.0
        };

        let (columns, rows) = self.pixel_span(object_bounds(object));
        for y in rows {
            for x in columns.clone() {
                let local = to_local * self.scene_point(x, y);
                let pixel = self.image.get_pixel_mut(x, y);
                if let Some(color) = fill {
                    if outline.contains(local, 0.0) {
                        blend(pixel, color);
                    }
                }
                if let Some(color) = stroke {
                    if outline.contains(local, half_stroke)
                        && !outline.contains(local, -half_stroke)
                    {
                        blend(pixel, color);
                    }
                }
            }
        }
    }
}

/// Paintable outline in intrinsic coordinates.
enum Outline {
    Rect { rect: Rect, radius: f64 },
    Ellipse { rect: Rect },
}

impl Outline {
    fn of(object: &RenderObject) -> Option<Self> {
        let geometry = &object.geometry;
        match &object.shape {
            Shape::Rectangle(rectangle) => {
                let rounded = rectangle.as_rounded_rect(geometry);
                Some(Outline::Rect {
                    rect: rounded.rect(),
                    radius: rounded.radii().top_left,
                })
            }
            Shape::Ellipse(_) => Some(Outline::Ellipse {
                rect: Rect::new(0.0, 0.0, geometry.width, geometry.height),
            }),
            Shape::Text(_) => None,
        }
    }

    /// Containment after growing (or shrinking, when negative) the outline.
    fn contains(&self, point: Point, grow: f64) -> bool {
        match self {
            Outline::Rect { rect, radius } => {
                let rect = rect.inflate(grow, grow);
                if rect.width() <= 0.0 || rect.height() <= 0.0 {
                    return false;
                }
                if *radius <= 0.0 {
                    return rect.contains(point);
                }
                rect.to_rounded_rect((radius + grow).max(0.0)).contains(point)
            }
            Outline::Ellipse { rect } => {
                let rect = rect.inflate(grow, grow);
                if rect.width() <= 0.0 || rect.height() <= 0.0 {
                    return false;
                }
                kurbo::Ellipse::from_rect(rect).contains(point)
            }
        }
    }
}

/// Source-over compositing of a straight-alpha color.
fn blend(pixel: &mut Rgba<u8>, color: Color) {
    let src = color.to_rgba8();
    let src_a = src.a as f64 / 255.0;
    if src_a <= 0.0 {
        return;
    }
    let dst_a = pixel[3] as f64 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    let mix = |s: u8, d: u8| {
        let value = (s as f64 * src_a + d as f64 * dst_a * (1.0 - src_a)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    *pixel = Rgba([
        mix(src.r, pixel[0]),
        mix(src.g, pixel[1]),
        mix(src.b, pixel[2]),
        (out_a * 255.0).round() as u8,
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::shapes::{Ellipse, Geometry, Rectangle, ShapeStyle, Text};

    const RED: SerializableColor = SerializableColor::rgb(255, 0, 0);
    const CLEAR: SerializableColor = SerializableColor::new(0, 0, 0, 0);

    fn solid(shape: Shape, geometry: Geometry, fill: SerializableColor) -> RenderObject {
        RenderObject::new(
            shape,
            geometry,
            ShapeStyle {
                fill: Some(fill),
                stroke: None,
                stroke_width: 0.0,
                opacity: 1.0,
            },
        )
    }

    fn square(size: f64, fill: SerializableColor) -> RenderObject {
        solid(
            Shape::Rectangle(Rectangle::default()),
            Geometry::new(0.0, 0.0, size, size),
            fill,
        )
    }

    #[test]
    fn test_multiplier_scales_output() {
        let object = square(10.0, RED);
        let image = rasterize(&[&object], 2.0, None).unwrap();
        assert_eq!((image.width(), image.height()), (20, 20));
        assert_eq!(image.pixel(10, 10), Some(RED));
        assert_eq!(image.pixel(0, 0), Some(RED));
    }

    #[test]
    fn test_invalid_multiplier() {
        let object = square(10.0, RED);
        assert!(matches!(
            rasterize(&[&object], 0.0, None),
            Err(ExportError::InvalidMultiplier(_))
        ));
    }

    #[test]
    fn test_ellipse_leaves_corners_empty() {
        let object = solid(
            Shape::Ellipse(Ellipse::new(10.0, 10.0)),
            Geometry::new(0.0, 0.0, 20.0, 20.0),
            RED,
        );
        let image = rasterize(&[&object], 1.0, None).unwrap();
        assert_eq!(image.pixel(0, 0), Some(CLEAR));
        assert_eq!(image.pixel(10, 10), Some(RED));
    }

    #[test]
    fn test_rounded_corners_are_cut() {
        let object = solid(
            Shape::Rectangle(Rectangle::new(8.0)),
            Geometry::new(0.0, 0.0, 40.0, 40.0),
            RED,
        );
        let image = rasterize(&[&object], 1.0, None).unwrap();
        assert_eq!(image.pixel(0, 0), Some(CLEAR));
        assert_eq!(image.pixel(20, 0), Some(RED));
    }

    #[test]
    fn test_later_objects_paint_on_top() {
        let below = square(10.0, RED);
        let above = solid(
            Shape::Rectangle(Rectangle::default()),
            Geometry::new(5.0, 0.0, 5.0, 10.0),
            SerializableColor::rgb(0, 0, 255),
        );
        let image = rasterize(&[&below, &above], 1.0, None).unwrap();
        assert_eq!(image.pixel(2, 5), Some(RED));
        assert_eq!(image.pixel(7, 5), Some(SerializableColor::rgb(0, 0, 255)));
    }

    #[test]
    fn test_opacity_blends_with_background() {
        let mut object = square(10.0, RED);
        object.style.opacity = 0.5;
        let image = rasterize(&[&object], 1.0, Some(SerializableColor::white())).unwrap();
        assert_eq!(image.pixel(5, 5), Some(SerializableColor::rgb(255, 127, 127)));
    }

    #[test]
    fn test_rotation_uncovers_bounding_corners() {
        let mut object = square(10.0, RED);
        object.geometry.angle = 45.0;
        let image = rasterize(&[&object], 4.0, None).unwrap();
        assert_eq!(image.pixel(0, 0), Some(CLEAR));
        let center = image.width() / 2;
        assert_eq!(image.pixel(center, center), Some(RED));
    }

    #[test]
    fn test_text_is_skipped() {
        let text = solid(
            Shape::Text(Text::new("Hello", 16.0)),
            Geometry::new(0.0, 0.0, 40.0, 20.0),
            RED,
        );
        let image = rasterize(&[&text], 1.0, None).unwrap();
        assert!(image.as_rgba().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_stroke_paints_border_only() {
        let object = RenderObject::new(
            Shape::Rectangle(Rectangle::default()),
            Geometry::new(0.0, 0.0, 20.0, 20.0),
            ShapeStyle {
                fill: None,
                stroke: Some(RED),
                stroke_width: 2.0,
                opacity: 1.0,
            },
        );
        let image = rasterize(&[&object], 1.0, None).unwrap();
        assert_eq!(image.pixel(0, 10), Some(RED));
        assert_eq!(image.pixel(11, 11), Some(CLEAR));
    }
}
