//! Viewport transform for pan/zoom.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Identity transform coefficients, as persisted for a fresh canvas.
pub const IDENTITY_TRANSFORM: [f64; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Viewport manages the scene-to-screen transform of a surface.
///
/// The transform is always a uniform scale followed by a translation, so
/// the zoom level is its first coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Scene-to-screen transform.
    transform: Affine,
    /// Minimum allowed zoom level
    pub min_zoom: f64,
    /// Maximum allowed zoom level
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            min_zoom: 0.1,
            max_zoom: 20.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Viewport with custom zoom bounds.
    pub fn with_limits(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    /// Get the affine transform for rendering (scene to screen).
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Replace the transform wholesale, e.g. when restoring a document.
    pub fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    pub fn zoom(&self) -> f64 {
        self.transform.as_coeffs()[0]
    }

    pub fn translation(&self) -> Vec2 {
        self.transform.translation()
    }

    /// Convert a screen point to scene coordinates.
    pub fn screen_to_scene(&self, screen_point: Point) -> Point {
        self.transform.inverse() * screen_point
    }

    /// Convert a scene point to screen coordinates.
    pub fn scene_to_screen(&self, scene_point: Point) -> Point {
        self.transform * scene_point
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.transform = Affine::translate(delta) * self.transform;
    }

    /// Set the zoom level, keeping the given screen point fixed.
    ///
    /// The level is clamped to `[min_zoom, max_zoom]`.
    pub fn zoom_to_point(&mut self, screen_point: Point, zoom: f64) {
        let zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        let scene_point = self.screen_to_scene(screen_point);
        let offset = Vec2::new(
            screen_point.x - scene_point.x * zoom,
            screen_point.y - scene_point.y * zoom,
        );
        self.transform = Affine::translate(offset) * Affine::scale(zoom);
    }

    /// Coefficients `[a, b, c, d, e, f]` for persistence.
    pub fn to_array(&self) -> [f64; 6] {
        self.transform.as_coeffs()
    }

    /// Reset to the identity transform.
    pub fn reset(&mut self) {
        self.transform = Affine::IDENTITY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_viewport() {
        let viewport = Viewport::new();
        assert!((viewport.zoom() - 1.0).abs() < f64::EPSILON);
        assert_eq!(viewport.to_array(), IDENTITY_TRANSFORM);
    }

    #[test]
    fn test_screen_to_scene_with_pan_and_zoom() {
        let mut viewport = Viewport::new();
        viewport.pan(Vec2::new(50.0, 100.0));
        viewport.zoom_to_point(Point::new(50.0, 100.0), 2.0);
        let scene = viewport.screen_to_scene(Point::new(150.0, 300.0));
        assert!((scene.x - 50.0).abs() < 1e-9);
        assert!((scene.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_keeps_pivot_fixed() {
        let mut viewport = Viewport::new();
        viewport.pan(Vec2::new(30.0, -20.0));
        let pivot = Point::new(200.0, 120.0);
        let before = viewport.screen_to_scene(pivot);
        viewport.zoom_to_point(pivot, 3.5);
        let after = viewport.screen_to_scene(pivot);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
        assert!((viewport.zoom() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut viewport = Viewport::new();
        viewport.zoom_to_point(Point::ZERO, 0.001);
        assert!((viewport.zoom() - viewport.min_zoom).abs() < f64::EPSILON);

        viewport.zoom_to_point(Point::ZERO, 1000.0);
        assert!((viewport.zoom() - viewport.max_zoom).abs() < f64::EPSILON);
    }

    #[test]
    fn test_pan_is_in_screen_pixels() {
        let mut viewport = Viewport::new();
        viewport.zoom_to_point(Point::ZERO, 2.0);
        viewport.pan(Vec2::new(10.0, 20.0));
        let translation = viewport.translation();
        assert!((translation.x - 10.0).abs() < f64::EPSILON);
        assert!((translation.y - 20.0).abs() < f64::EPSILON);
    }
}
